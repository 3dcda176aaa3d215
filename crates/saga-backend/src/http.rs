//! reqwest implementation of the backend contract.

use futures_util::TryStreamExt;
use tracing::debug;

use crate::api::{Backend, EventStream};
use crate::error::BackendError;
use crate::sse::SseStream;
use crate::types::{
    HealthResponse, SessionCreateRequest, SessionResponse, SessionSummary, TaskCreateRequest,
    TaskResponse, TaskSummary,
};

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Turn a non-success response into a `Rejected` error, pulling
    /// the backend's `detail` field out of the JSON body when present.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .unwrap_or(body);
        Err(BackendError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn create_session(
        &self,
        request: &SessionCreateRequest,
    ) -> Result<SessionResponse, BackendError> {
        debug!(repo_url = %request.repo_url, "creating session");
        let response = self
            .client
            .post(self.url("/sessions"))
            .json(request)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn create_task(
        &self,
        session_id: &str,
        request: &TaskCreateRequest,
    ) -> Result<TaskResponse, BackendError> {
        debug!(session_id, model = %request.model, "creating task");
        let response = self
            .client
            .post(self.url(&format!("/sessions/{session_id}/tasks")))
            .json(request)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn stop_task(&self, task_id: &str) -> Result<(), BackendError> {
        debug!(task_id, "requesting stop");
        let response = self
            .client
            .post(self.url(&format!("/tasks/{task_id}/stop")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn open_events(&self, task_id: &str) -> Result<EventStream, BackendError> {
        debug!(task_id, "opening event stream");
        let response = self
            .client
            .get(self.url(&format!("/tasks/{task_id}/events")))
            .send()
            .await?;
        let response = Self::check(response).await?;
        let bytes = response
            .bytes_stream()
            .map_err(|e| BackendError::Stream(e.to_string()));
        Ok(Box::pin(SseStream::new(Box::pin(bytes))))
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, BackendError> {
        let response = self.client.get(self.url("/sessions")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn list_tasks(&self) -> Result<Vec<TaskSummary>, BackendError> {
        let response = self.client.get(self.url("/tasks")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn close_session(&self, session_id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.url(&format!("/sessions/{session_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn health(&self) -> Result<HealthResponse, BackendError> {
        let response = self.client.get(self.url("/health")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
