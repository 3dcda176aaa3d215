//! Raw events as delivered by the backend stream.
//!
//! One stream connection delivers a chronological sequence of these;
//! the `type` tag is dot-namespaced (`task.start`, `llm.tool_call.end`,
//! `stream.keepalive`, ...). Payload shapes are backend-owned and
//! accessed defensively — a missing field never faults the stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One occurrence in the agent's execution, immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub data: Value,
}

// ── Event type tags ──

pub const TASK_START: &str = "task.start";
pub const TASK_FINISH: &str = "task.finish";
pub const TASK_ERROR: &str = "task.error";
pub const AGENT_LOOP_START: &str = "agent.loop.start";
pub const LLM_THOUGHT: &str = "llm.thought";
pub const TOOL_CALL_START: &str = "llm.tool_call.start";
pub const TOOL_CALL_END: &str = "llm.tool_call.end";
pub const KEEPALIVE: &str = "stream.keepalive";

impl RawEvent {
    pub fn new(event_type: impl Into<String>, timestamp: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: timestamp.into(),
            data,
        }
    }

    /// Periodic liveness marker — accepted and discarded, never stored.
    pub fn is_keepalive(&self) -> bool {
        self.event_type == KEEPALIVE
    }

    /// Namespaces handled entirely by the external setup/repo layer.
    /// They sit in the store for replay but never become display records.
    pub fn is_excluded_namespace(&self) -> bool {
        self.event_type.starts_with("repo.") || self.event_type.starts_with("setup.")
    }

    /// Terminal events: the run is over once one of these is seen.
    pub fn is_terminal(&self) -> bool {
        self.event_type == TASK_FINISH || self.event_type == TASK_ERROR
    }

    /// String field from the payload, first key that is present wins.
    pub fn data_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|k| self.data.get(k).and_then(|v| v.as_str()))
    }

    /// Bool field from the payload.
    pub fn data_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(|v| v.as_bool())
    }

    /// Tool name for `llm.tool_call.*` events.
    pub fn tool_name(&self) -> Option<&str> {
        self.data_str(&["tool", "tool_name"])
    }

    /// Tool parameters for a `llm.tool_call.start` event: the `params`
    /// object when present, otherwise the payload minus the name field.
    pub fn tool_params(&self) -> Value {
        if let Some(params) = self.data.get("params") {
            return params.clone();
        }
        match &self.data {
            Value::Object(map) => {
                let mut rest = map.clone();
                rest.remove("tool");
                rest.remove("tool_name");
                Value::Object(rest)
            }
            other => other.clone(),
        }
    }
}
