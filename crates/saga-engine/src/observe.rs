//! Engine observation seam. Frontends register an observer and render
//! from the callbacks; the engine never prints anything itself.

use saga_core::ProcessedEvent;

use crate::session::SessionState;
use crate::task::TaskState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// All methods default to no-ops so observers implement only what they
/// render.
pub trait EngineObserver: Send {
    /// The view model changed: a record was appended or mutated in
    /// place. `records` is the full ordered view.
    fn on_view_model_changed(&mut self, records: &[ProcessedEvent]) {
        let _ = records;
    }

    fn on_session_state_changed(&mut self, state: &SessionState) {
        let _ = state;
    }

    fn on_task_state_changed(&mut self, state: &TaskState) {
        let _ = state;
    }

    /// One-shot user-facing notice (task finished, stream failed, …).
    fn on_notify(&mut self, message: &str, severity: Severity) {
        let _ = (message, severity);
    }
}
