//! The backend seam: one trait, implemented by the HTTP client and by
//! test doubles.

use std::pin::Pin;

use futures_util::Stream;
use saga_core::RawEvent;

use crate::error::BackendError;
use crate::types::{
    HealthResponse, SessionCreateRequest, SessionResponse, SessionSummary, TaskCreateRequest,
    TaskResponse, TaskSummary,
};

/// Ordered stream of raw events for one task. An `Err` item means the
/// connection itself failed; the stream must not be polled after it.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<RawEvent, BackendError>> + Send>>;

#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn create_session(
        &self,
        request: &SessionCreateRequest,
    ) -> Result<SessionResponse, BackendError>;

    async fn create_task(
        &self,
        session_id: &str,
        request: &TaskCreateRequest,
    ) -> Result<TaskResponse, BackendError>;

    /// Advisory stop. Success means the backend accepted the request,
    /// not that the task stopped.
    async fn stop_task(&self, task_id: &str) -> Result<(), BackendError>;

    /// Open the server-sent event subscription for one task.
    async fn open_events(&self, task_id: &str) -> Result<EventStream, BackendError>;

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, BackendError>;

    async fn list_tasks(&self) -> Result<Vec<TaskSummary>, BackendError>;

    async fn close_session(&self, session_id: &str) -> Result<(), BackendError>;

    async fn health(&self) -> Result<HealthResponse, BackendError>;
}
