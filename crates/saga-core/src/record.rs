//! Display-ready records derived from raw events.

use serde::Serialize;
use serde_json::Value;

/// Stable identifier for one view-model record.
///
/// Events that create a fresh record are keyed by store position plus
/// timestamp, which cannot collide for distinct events. Tool-call
/// starts are keyed by `(tool_name, timestamp)` instead so that the
/// later end event, which carries only the tool name, lands in the
/// same key space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn positional(index: usize, timestamp: &str) -> Self {
        Self(format!("{index}:{timestamp}"))
    }

    pub fn tool_call(tool_name: &str, timestamp: &str) -> Self {
        Self(format!("tool:{tool_name}@{timestamp}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Running,
    Completed,
    Error,
}

/// Phase tag for lifecycle records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    TaskStart,
    LoopStart,
    TaskFinish,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRecord {
    pub status: ToolStatus,
    pub tool_name: String,
    pub params: Value,
    pub output: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordKind {
    TaskLifecycle {
        phase: LifecyclePhase,
        detail: Option<String>,
    },
    Error {
        message: String,
    },
    Thought {
        text: String,
    },
    ToolCall(ToolCallRecord),
}

/// One entry of the view model. `raw_index` is a weak back-reference
/// into the event store; the record never owns the raw event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedEvent {
    pub key: RecordKey,
    pub timestamp: String,
    pub raw_index: usize,
    #[serde(flatten)]
    pub kind: RecordKind,
}

impl ProcessedEvent {
    pub fn tool_call(&self) -> Option<&ToolCallRecord> {
        match &self.kind {
            RecordKind::ToolCall(tc) => Some(tc),
            _ => None,
        }
    }

    pub fn tool_call_mut(&mut self) -> Option<&mut ToolCallRecord> {
        match &mut self.kind {
            RecordKind::ToolCall(tc) => Some(tc),
            _ => None,
        }
    }
}
