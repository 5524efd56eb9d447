use crate::error::ApiError;
use crate::filters::ListFilters;
use crate::models::{NewTask, Task, TaskUpdate};
use reqwest::{Client, Response};
use tracing::debug;

/// Typed client for the `/tasks` resource collection.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ApiClient {
        ApiClient {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/tasks{}", self.base_url, path)
    }

    pub async fn fetch_tasks(&self, filters: &ListFilters) -> Result<Vec<Task>, ApiError> {
        let url = self.url("");
        let query = filters.query();
        debug!(%url, ?query, "listing tasks");

        let res = self.client.get(&url).query(&query).send().await?;
        Ok(check_status(res).await?.json::<Vec<Task>>().await?)
    }

    pub async fn fetch_task(&self, task_id: u64) -> Result<Task, ApiError> {
        let url = self.url(&format!("/{}", task_id));
        debug!(%url, "fetching task");

        let res = self.client.get(&url).send().await?;
        Ok(check_status(res).await?.json::<Task>().await?)
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        let url = self.url("");
        debug!(%url, title = %task.title, "creating task");

        let res = self.client.post(&url).json(task).send().await?;
        Ok(check_status(res).await?.json::<Task>().await?)
    }

    pub async fn update_task(&self, task_id: u64, update: &TaskUpdate) -> Result<Task, ApiError> {
        let url = self.url(&format!("/{}", task_id));
        debug!(%url, ?update, "updating task");

        let res = self.client.patch(&url).json(update).send().await?;
        Ok(check_status(res).await?.json::<Task>().await?)
    }

    pub async fn delete_task(&self, task_id: u64) -> Result<(), ApiError> {
        let url = self.url(&format!("/{}", task_id));
        debug!(%url, "deleting task");

        let res = self.client.delete(&url).send().await?;
        check_status(res).await?;
        Ok(())
    }

    pub async fn mark_task_done(&self, task_id: u64) -> Result<Task, ApiError> {
        let url = self.url(&format!("/{}/done", task_id));
        debug!(%url, "marking task done");

        let res = self.client.patch(&url).send().await?;
        Ok(check_status(res).await?.json::<Task>().await?)
    }
}

async fn check_status(res: Response) -> Result<Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        Ok(res)
    } else {
        let body = res.text().await.unwrap_or_default();
        Err(ApiError::Status { status, body })
    }
}
