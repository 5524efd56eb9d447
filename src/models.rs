use serde::{Deserialize, Serialize};

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 10;
pub const DEFAULT_PRIORITY: u8 = 5;

// Task as returned by the service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_done: bool,
    pub priority: u8,
    pub created_at: String,
    pub updated_at: Option<String>,
}

// Body of POST /tasks
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: u8,
}

/// Body of `PATCH /tasks/{id}`. Unset fields are left out of the JSON.
///
/// `description` is tri-state: `None` leaves it untouched, `Some(None)` is sent as an
/// explicit `null` and clears it, `Some(Some(..))` replaces it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

impl TaskUpdate {
    pub fn reopen() -> Self {
        TaskUpdate {
            is_done: Some(false),
            ..Default::default()
        }
    }
}
