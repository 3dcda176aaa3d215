//! Folds the raw event sequence into the view model.
//!
//! Called once per event in delivery order, and safe to re-run over a
//! full store from scratch: creating events are guarded by their key,
//! correlating events by the correlator entry they consume.

use tracing::{debug, warn};

use crate::cache::ViewModel;
use crate::correlate::Correlator;
use crate::event::{self, RawEvent};
use crate::record::{
    LifecyclePhase, ProcessedEvent, RecordKey, RecordKind, ToolCallRecord, ToolStatus,
};

/// Reconcile one raw event into the cache. `index` is the event's
/// store position. Returns true when the cache changed (a record was
/// inserted or mutated in place).
pub fn reconcile(
    raw: &RawEvent,
    index: usize,
    cache: &mut ViewModel,
    correlator: &mut Correlator,
) -> bool {
    if raw.is_excluded_namespace() || raw.is_keepalive() {
        return false;
    }

    match raw.event_type.as_str() {
        event::TASK_START => insert_created(cache, created_lifecycle(raw, index, LifecyclePhase::TaskStart, &["query"])),
        event::TASK_FINISH => insert_created(cache, created_lifecycle(raw, index, LifecyclePhase::TaskFinish, &["response"])),
        event::AGENT_LOOP_START => insert_created(cache, created_lifecycle(raw, index, LifecyclePhase::LoopStart, &["message"])),
        event::TASK_ERROR => insert_created(cache, created_error(raw, index)),
        event::LLM_THOUGHT => insert_created(cache, created_thought(raw, index)),
        event::TOOL_CALL_START => tool_call_start(raw, index, cache, correlator),
        event::TOOL_CALL_END => tool_call_end(raw, cache, correlator),
        other => {
            // Forward compatibility: unknown kinds are dropped silently.
            debug!(event_type = other, "ignoring unrecognized event type");
            false
        }
    }
}

fn insert_created(cache: &mut ViewModel, record: ProcessedEvent) -> bool {
    cache.insert(record)
}

fn created_lifecycle(
    raw: &RawEvent,
    index: usize,
    phase: LifecyclePhase,
    detail_keys: &[&str],
) -> ProcessedEvent {
    ProcessedEvent {
        key: RecordKey::positional(index, &raw.timestamp),
        timestamp: raw.timestamp.clone(),
        raw_index: index,
        kind: RecordKind::TaskLifecycle {
            phase,
            detail: raw.data_str(detail_keys).map(str::to_string),
        },
    }
}

fn created_error(raw: &RawEvent, index: usize) -> ProcessedEvent {
    let message = raw
        .data_str(&["error", "message"])
        .unwrap_or("task failed")
        .to_string();
    ProcessedEvent {
        key: RecordKey::positional(index, &raw.timestamp),
        timestamp: raw.timestamp.clone(),
        raw_index: index,
        kind: RecordKind::Error { message },
    }
}

fn created_thought(raw: &RawEvent, index: usize) -> ProcessedEvent {
    let text = raw
        .data_str(&["thought", "content", "text", "message"])
        .unwrap_or_default()
        .to_string();
    ProcessedEvent {
        key: RecordKey::positional(index, &raw.timestamp),
        timestamp: raw.timestamp.clone(),
        raw_index: index,
        kind: RecordKind::Thought { text },
    }
}

fn tool_call_start(
    raw: &RawEvent,
    index: usize,
    cache: &mut ViewModel,
    correlator: &mut Correlator,
) -> bool {
    let Some(tool_name) = raw.tool_name() else {
        warn!("tool_call.start without a tool name, dropped");
        return false;
    };
    let key = RecordKey::tool_call(tool_name, &raw.timestamp);
    if cache.contains(&key) {
        // Replayed delivery — the record (and any later resolution of
        // it) already happened; re-registering would resurrect it.
        return false;
    }
    let record = ProcessedEvent {
        key: key.clone(),
        timestamp: raw.timestamp.clone(),
        raw_index: index,
        kind: RecordKind::ToolCall(ToolCallRecord {
            status: ToolStatus::Running,
            tool_name: tool_name.to_string(),
            params: raw.tool_params(),
            output: None,
            error: None,
        }),
    };
    cache.insert(record);
    if let Some(displaced) = correlator.register(tool_name, key) {
        // Overlapping same-name call: last-started wins, the earlier
        // one can no longer be resolved.
        warn!(
            tool = tool_name,
            displaced = displaced.as_str(),
            "overlapping tool call displaced an unresolved start"
        );
    }
    true
}

fn tool_call_end(raw: &RawEvent, cache: &mut ViewModel, correlator: &mut Correlator) -> bool {
    let Some(tool_name) = raw.tool_name() else {
        return false;
    };
    let Some(key) = correlator.resolve(tool_name) else {
        // Unknown or already-resolved call — a benign race, never an
        // error and never a new record.
        debug!(tool = tool_name, "tool_call.end without a running start, ignored");
        return false;
    };
    let Some(tool) = cache.get_mut(&key).and_then(ProcessedEvent::tool_call_mut) else {
        return false;
    };
    if tool.status != ToolStatus::Running {
        return false; // status never reverses
    }
    let successful = raw.data_bool("was_successful").unwrap_or(false);
    tool.status = if successful {
        ToolStatus::Completed
    } else {
        ToolStatus::Error
    };
    tool.output = raw.data_str(&["response_preview", "output"]).map(str::to_string);
    tool.error = raw.data_str(&["error"]).map(str::to_string);
    true
}
