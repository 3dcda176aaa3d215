//! Console renderer for the engine's view model.

use std::collections::HashMap;

use saga_core::{LifecyclePhase, ProcessedEvent, RecordKey, RecordKind, ToolStatus};
use saga_engine::{EngineObserver, SessionState, Severity, TaskState};

pub struct ConsoleObserver {
    printed: usize,
    tool_status: HashMap<RecordKey, ToolStatus>,
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self {
            printed: 0,
            tool_status: HashMap::new(),
        }
    }

    fn print_record(&mut self, record: &ProcessedEvent) {
        let ts = short_ts(&record.timestamp);
        match &record.kind {
            RecordKind::TaskLifecycle { phase, detail } => {
                let label = match phase {
                    LifecyclePhase::TaskStart => "task started",
                    LifecyclePhase::LoopStart => "iteration",
                    LifecyclePhase::TaskFinish => "task finished",
                };
                match detail {
                    Some(d) => println!("[{ts}] * {label}: {d}"),
                    None => println!("[{ts}] * {label}"),
                }
            }
            RecordKind::Error { message } => println!("[{ts}] ! {message}"),
            RecordKind::Thought { text } => println!("[{ts}] ~ {text}"),
            RecordKind::ToolCall(tc) => {
                let params = compact(&tc.params);
                println!("[{ts}] > {}({params}) ...", tc.tool_name);
                self.tool_status.insert(record.key.clone(), tc.status);
            }
        }
    }

    /// A tool call already on screen changed status; print the outcome
    /// on its own line rather than redrawing.
    fn print_tool_update(&mut self, record: &ProcessedEvent) {
        let Some(tc) = record.tool_call() else { return };
        let known = self.tool_status.get(&record.key).copied();
        if known == Some(tc.status) {
            return;
        }
        self.tool_status.insert(record.key.clone(), tc.status);
        let ts = short_ts(&record.timestamp);
        match tc.status {
            ToolStatus::Completed => {
                let preview = tc.output.as_deref().unwrap_or("");
                println!("[{ts}]   {} ok {}", tc.tool_name, truncate(preview, 80));
            }
            ToolStatus::Error => {
                let reason = tc.error.as_deref().unwrap_or("failed");
                println!("[{ts}]   {} FAILED: {}", tc.tool_name, truncate(reason, 120));
            }
            ToolStatus::Running => {}
        }
    }
}

impl EngineObserver for ConsoleObserver {
    fn on_view_model_changed(&mut self, records: &[ProcessedEvent]) {
        for record in &records[..self.printed.min(records.len())] {
            self.print_tool_update(record);
        }
        while self.printed < records.len() {
            let record = records[self.printed].clone();
            self.print_record(&record);
            self.printed += 1;
        }
    }

    fn on_session_state_changed(&mut self, state: &SessionState) {
        match state {
            SessionState::NoSession => {}
            SessionState::Creating => println!("creating session..."),
            SessionState::Active { session_id, repo } => {
                let fork = if repo.is_fork { " (fork)" } else { "" };
                println!("connected: {}/{}{fork} [{session_id}]", repo.owner, repo.name);
            }
        }
    }

    fn on_task_state_changed(&mut self, state: &TaskState) {
        if let TaskState::Running { task_id: Some(id) } = state {
            println!("task {id} running");
            self.printed = 0;
            self.tool_status.clear();
        }
    }

    fn on_notify(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => println!("-- {message}"),
            Severity::Success => println!("== {message}"),
            Severity::Error => eprintln!("!! {message}"),
        }
    }
}

/// `2026-01-01T12:34:56.789` -> `12:34:56`; anything that does not
/// slice cleanly passes through unchanged.
fn short_ts(ts: &str) -> &str {
    if ts.len() >= 19 && ts.as_bytes()[10] == b'T' {
        ts.get(11..19).unwrap_or(ts)
    } else {
        ts
    }
}

fn compact(params: &serde_json::Value) -> String {
    let s = match params {
        serde_json::Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    };
    truncate(&s, 60)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}...")
    }
}
