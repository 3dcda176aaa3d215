//! Task lifecycle: `Idle → Running → Idle`, with an advisory
//! `Running → Stopping → Idle` path. A stop request never kills the
//! stream; the task stays observable until a terminal event arrives.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskState {
    Idle,
    /// `task_id` is `None` between the create request going out and the
    /// backend acknowledging it.
    Running { task_id: Option<String> },
    Stopping { task_id: String },
}

impl TaskState {
    pub fn is_idle(&self) -> bool {
        matches!(self, TaskState::Idle)
    }

    /// Running or stopping; a stop request does not end the task.
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }

    pub fn is_stopping(&self) -> bool {
        matches!(self, TaskState::Stopping { .. })
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            TaskState::Idle => None,
            TaskState::Running { task_id } => task_id.as_deref(),
            TaskState::Stopping { task_id } => Some(task_id),
        }
    }
}
