//! In-memory stand-in for the task service, served over real HTTP on an ephemeral port.

use crate::models::Task;
use axum::{
    extract::{Path, RawQuery, State},
    http::{Method, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct Inner {
    tasks: Vec<Task>,
    next_id: u64,
    requests: Vec<RecordedRequest>,
    failing: bool,
    clock: u64,
}

impl Inner {
    fn record(&mut self, method: Method, path: String, query: Option<String>, body: Option<Value>) {
        self.requests.push(RecordedRequest {
            method: method.as_str().to_string(),
            path,
            query,
            body,
        });
    }

    // Distinct, ordered timestamps without depending on wall-clock resolution.
    fn timestamp(&mut self) -> String {
        self.clock += 1;
        format!("2024-05-01T09:{:02}:{:02}", self.clock / 60, self.clock % 60)
    }

    fn insert(&mut self, title: &str, description: Option<&str>, priority: u8) -> Task {
        self.next_id += 1;
        let task = Task {
            id: self.next_id,
            title: title.to_string(),
            description: description.map(str::to_string),
            is_done: false,
            priority,
            created_at: self.timestamp(),
            updated_at: None,
        };
        self.tasks.push(task.clone());
        task
    }
}

type Shared = Arc<Mutex<Inner>>;

pub struct MockServer {
    pub base_url: String,
    inner: Shared,
}

impl MockServer {
    pub async fn start() -> MockServer {
        let inner: Shared = Arc::default();
        let router = Router::new()
            .route("/api/tasks", get(list_tasks).post(create_task))
            .route(
                "/api/tasks/:id",
                get(get_task).patch(update_task).delete(delete_task),
            )
            .route("/api/tasks/:id/done", patch(mark_done))
            .with_state(inner.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        MockServer {
            base_url: format!("http://{}/api", addr),
            inner,
        }
    }

    /// Seeds a task without recording a request.
    pub fn insert(&self, title: &str, description: Option<&str>, priority: u8) -> Task {
        self.inner
            .lock()
            .unwrap()
            .insert(title, description, priority)
    }

    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().unwrap().failing = failing;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.inner.lock().unwrap().tasks.clone()
    }
}

async fn list_tasks(
    State(inner): State<Shared>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<Task>>, StatusCode> {
    let mut inner = inner.lock().unwrap();
    inner.record(Method::GET, "/api/tasks".to_string(), raw.clone(), None);
    if inner.failing {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let params: HashMap<String, String> = raw
        .as_deref()
        .map(query_pairs)
        .unwrap_or_default();

    let mut tasks: Vec<Task> = inner
        .tasks
        .iter()
        .filter(|task| match params.get("status").map(String::as_str) {
            Some("done") => task.is_done,
            Some("undone") => !task.is_done,
            _ => true,
        })
        .filter(|task| match params.get("search") {
            Some(term) => {
                let term = term.to_lowercase();
                task.title.to_lowercase().contains(&term)
                    || task
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
            None => true,
        })
        .cloned()
        .collect();

    match params.get("sort_by_priority").map(String::as_str) {
        Some("asc") => tasks.sort_by_key(|task| task.priority),
        Some("desc") => tasks.sort_by_key(|task| std::cmp::Reverse(task.priority)),
        _ => {}
    }

    Ok(Json(tasks))
}

fn query_pairs(query: &str) -> HashMap<String, String> {
    reqwest::Url::parse(&format!("http://mock/?{}", query))
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

async fn get_task(
    State(inner): State<Shared>,
    Path(id): Path<u64>,
) -> Result<Json<Task>, StatusCode> {
    let mut inner = inner.lock().unwrap();
    inner.record(Method::GET, format!("/api/tasks/{}", id), None, None);
    if inner.failing {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    inner
        .tasks
        .iter()
        .find(|task| task.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_task(
    State(inner): State<Shared>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Task>), StatusCode> {
    let mut inner = inner.lock().unwrap();
    inner.record(Method::POST, "/api/tasks".to_string(), None, Some(body.clone()));
    if inner.failing {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let title = body["title"].as_str().ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    let priority = body["priority"].as_u64().unwrap_or(5);
    if !(1..=10).contains(&priority) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let task = inner.insert(title, body["description"].as_str(), priority as u8);
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(inner): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Task>, StatusCode> {
    let mut inner = inner.lock().unwrap();
    inner.record(
        Method::PATCH,
        format!("/api/tasks/{}", id),
        None,
        Some(body.clone()),
    );
    if inner.failing {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let updated_at = inner.timestamp();
    let task = inner
        .tasks
        .iter_mut()
        .find(|task| task.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;

    if let Some(title) = body.get("title").and_then(Value::as_str) {
        task.title = title.to_string();
    }
    if let Some(description) = body.get("description") {
        task.description = description.as_str().map(str::to_string);
    }
    if let Some(is_done) = body.get("is_done").and_then(Value::as_bool) {
        task.is_done = is_done;
    }
    if let Some(priority) = body.get("priority").and_then(Value::as_u64) {
        task.priority = priority as u8;
    }
    task.updated_at = Some(updated_at);
    Ok(Json(task.clone()))
}

async fn delete_task(State(inner): State<Shared>, Path(id): Path<u64>) -> StatusCode {
    let mut inner = inner.lock().unwrap();
    inner.record(Method::DELETE, format!("/api/tasks/{}", id), None, None);
    if inner.failing {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    let before = inner.tasks.len();
    inner.tasks.retain(|task| task.id != id);
    if inner.tasks.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn mark_done(
    State(inner): State<Shared>,
    Path(id): Path<u64>,
) -> Result<Json<Task>, StatusCode> {
    let mut inner = inner.lock().unwrap();
    inner.record(Method::PATCH, format!("/api/tasks/{}/done", id), None, None);
    if inner.failing {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let updated_at = inner.timestamp();
    let task = inner
        .tasks
        .iter_mut()
        .find(|task| task.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    task.is_done = true;
    task.updated_at = Some(updated_at);
    Ok(Json(task.clone()))
}
