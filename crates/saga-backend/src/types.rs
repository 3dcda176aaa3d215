//! Request/response shapes of the agent backend API.
//!
//! These mirror the backend contract verbatim; everything else about
//! the remote side is opaque to this crate.

use serde::{Deserialize, Serialize};

// ── Sessions ──

#[derive(Debug, Clone, Serialize)]
pub struct SessionCreateRequest {
    pub repo_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    #[serde(default)]
    pub status: String,
    pub repo_owner: String,
    pub repo_name: String,
    #[serde(default)]
    pub is_fork: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub status: String,
    pub repo_url: String,
}

// ── Tasks ──

#[derive(Debug, Clone, Serialize)]
pub struct TaskCreateRequest {
    pub query: String,
    pub model: String,
    pub max_iterations: u32,
}

pub const DEFAULT_MODEL: &str = "openai/gpt-4o";
pub const DEFAULT_MAX_ITERATIONS: u32 = 20;

impl TaskCreateRequest {
    pub fn new(query: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            model: model.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskResponse {
    pub task_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskSummary {
    pub task_id: String,
    pub session_id: String,
    pub query: String,
    pub status: String,
    pub started_at: String,
}

// ── Health ──

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}
