use crate::api::ApiClient;
use crate::error::{FormError, ValidationError};
use crate::models::{NewTask, Task, TaskUpdate, DEFAULT_PRIORITY, MAX_PRIORITY, MIN_PRIORITY};
use tracing::{error, info};

pub const SAVE_ERROR: &str = "Failed to save task. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveInput {
    Title,
    Description,
    Priority,
}

impl ActiveInput {
    pub fn next(self) -> Self {
        match self {
            ActiveInput::Title => ActiveInput::Description,
            ActiveInput::Description => ActiveInput::Priority,
            ActiveInput::Priority => ActiveInput::Title,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            ActiveInput::Title => ActiveInput::Priority,
            ActiveInput::Description => ActiveInput::Title,
            ActiveInput::Priority => ActiveInput::Description,
        }
    }
}

/// What a valid form turns into.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(NewTask),
    Update(u64, TaskUpdate),
}

/// Create/edit form. `editing` holds the task being edited, if any.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub editing: Option<Task>,
    pub title: String,
    pub description: String,
    pub priority: u8,
    pub active_input: ActiveInput,
    pub error: Option<String>,
}

impl Default for TaskForm {
    fn default() -> Self {
        TaskForm::new()
    }
}

impl TaskForm {
    pub fn new() -> TaskForm {
        TaskForm {
            editing: None,
            title: String::new(),
            description: String::new(),
            priority: DEFAULT_PRIORITY,
            active_input: ActiveInput::Title,
            error: None,
        }
    }

    pub fn for_task(task: &Task) -> TaskForm {
        TaskForm {
            editing: Some(task.clone()),
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            priority: task.priority.clamp(MIN_PRIORITY, MAX_PRIORITY),
            ..TaskForm::new()
        }
    }

    pub fn heading(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Task"
        } else {
            "Add New Task"
        }
    }

    pub fn push_char(&mut self, c: char) {
        match self.active_input {
            ActiveInput::Title => self.title.push(c),
            ActiveInput::Description => self.description.push(c),
            ActiveInput::Priority => match c {
                '+' => self.raise_priority(),
                '-' => self.lower_priority(),
                _ => {}
            },
        }
    }

    pub fn backspace(&mut self) {
        match self.active_input {
            ActiveInput::Title => {
                self.title.pop();
            }
            ActiveInput::Description => {
                self.description.pop();
            }
            ActiveInput::Priority => {}
        }
    }

    pub fn raise_priority(&mut self) {
        self.priority = (self.priority + 1).min(MAX_PRIORITY);
    }

    pub fn lower_priority(&mut self) {
        self.priority = self.priority.saturating_sub(1).max(MIN_PRIORITY);
    }

    pub fn next_input(&mut self) {
        self.active_input = self.active_input.next();
    }

    pub fn previous_input(&mut self) {
        self.active_input = self.active_input.previous();
    }

    /// Checks the fields without touching the network. The title is sent as typed;
    /// only a title that is blank after trimming is rejected.
    pub fn validate(&self) -> Result<Submission, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let description = if self.description.is_empty() {
            None
        } else {
            Some(self.description.clone())
        };

        Ok(match &self.editing {
            Some(task) => Submission::Update(
                task.id,
                TaskUpdate {
                    title: Some(self.title.clone()),
                    description: Some(description),
                    priority: Some(self.priority),
                    ..Default::default()
                },
            ),
            None => Submission::Create(NewTask {
                title: self.title.clone(),
                description,
                priority: self.priority,
            }),
        })
    }

    /// Validates and sends the form. Fields are reset on success and kept on failure,
    /// with `error` holding the message to show.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<Task, FormError> {
        let submission = match self.validate() {
            Ok(submission) => submission,
            Err(err) => {
                self.error = Some(err.to_string());
                return Err(err.into());
            }
        };

        let result = match &submission {
            Submission::Create(task) => api.create_task(task).await,
            Submission::Update(id, update) => api.update_task(*id, update).await,
        };

        match result {
            Ok(task) => {
                info!(task_id = task.id, "saved task");
                self.reset();
                Ok(task)
            }
            Err(err) => {
                error!(%err, "failed to save task");
                self.error = Some(SAVE_ERROR.to_string());
                Err(err.into())
            }
        }
    }

    pub fn reset(&mut self) {
        self.title.clear();
        self.description.clear();
        self.priority = DEFAULT_PRIORITY;
        self.active_input = ActiveInput::Title;
        self.error = None;
    }
}
