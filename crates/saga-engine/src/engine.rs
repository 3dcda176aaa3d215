//! The engine proper: owns the backend client, both lifecycle state
//! machines, and the reconciliation context for the current run.
//!
//! Every mutating method follows the same compare-and-set shape:
//! `Ok(true)` means the transition happened, `Ok(false)` means the
//! current state did not permit it, `Err` means a request was made and
//! failed. Callers can always retry; no guard panics.

use futures_util::StreamExt;
use tracing::{debug, info, warn};

use saga_backend::{Backend, EventStream};
use saga_backend::{SessionCreateRequest, TaskCreateRequest, DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL};
use saga_core::{ProcessedEvent, RawEvent, RunContext};

use crate::error::EngineError;
use crate::observe::{EngineObserver, Severity};
use crate::session::{validate_repo_url, RepoInfo, SessionState};
use crate::task::TaskState;

/// What one `pump` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    /// An event was delivered and processed (including ones that left
    /// the view model unchanged).
    Event,
    /// The run ended — terminal event, stream failure, or premature
    /// close. The task is idle again.
    Terminal,
    /// No stream is open; nothing to do.
    Idle,
}

pub struct Engine<B: Backend> {
    backend: B,
    session: SessionState,
    task: TaskState,
    run: RunContext,
    stream: Option<EventStream>,
    observers: Vec<Box<dyn EngineObserver>>,
    model: String,
    max_iterations: u32,
}

impl<B: Backend> Engine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            session: SessionState::NoSession,
            task: TaskState::Idle,
            run: RunContext::new(),
            stream: None,
            observers: Vec::new(),
            model: DEFAULT_MODEL.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn EngineObserver>) {
        self.observers.push(observer);
    }

    // ── Read side ──

    pub fn session_state(&self) -> &SessionState {
        &self.session
    }

    pub fn task_state(&self) -> &TaskState {
        &self.task
    }

    pub fn records(&self) -> &[ProcessedEvent] {
        self.run.records()
    }

    pub fn run(&self) -> &RunContext {
        &self.run
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ── Session lifecycle ──

    /// Connect to a repository. No-op unless currently disconnected;
    /// validation failures never leave the machine.
    pub async fn create_session(&mut self, repo_url: &str) -> Result<bool, EngineError> {
        if !matches!(self.session, SessionState::NoSession) {
            debug!(state = ?self.session, "create_session ignored");
            return Ok(false);
        }
        if let Err(reason) = validate_repo_url(repo_url) {
            self.notify(&reason, Severity::Error);
            return Err(EngineError::Validation(reason));
        }

        self.set_session(SessionState::Creating);
        let request = SessionCreateRequest {
            repo_url: repo_url.to_string(),
        };
        match self.backend.create_session(&request).await {
            Ok(response) => {
                info!(session_id = %response.session_id, "session active");
                self.run.reset();
                self.stream = None;
                self.emit_view();
                self.set_session(SessionState::Active {
                    session_id: response.session_id,
                    repo: RepoInfo {
                        owner: response.repo_owner,
                        name: response.repo_name,
                        is_fork: response.is_fork,
                    },
                });
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "session creation failed");
                self.set_session(SessionState::NoSession);
                self.notify(&format!("session creation failed: {e}"), Severity::Error);
                Err(e.into())
            }
        }
    }

    // ── Task lifecycle ──

    /// Submit a task and open its event stream. Requires an active
    /// session and an idle task.
    pub async fn start_task(&mut self, query: &str) -> Result<bool, EngineError> {
        let Some(session_id) = self.session.session_id().map(str::to_string) else {
            debug!("start_task ignored: no active session");
            return Ok(false);
        };
        if self.task.is_active() {
            debug!(state = ?self.task, "start_task ignored: task in flight");
            return Ok(false);
        }
        if query.trim().is_empty() {
            self.notify("query is empty", Severity::Error);
            return Err(EngineError::Validation("query is empty".to_string()));
        }

        self.run.reset();
        self.stream = None;
        self.emit_view();
        self.set_task(TaskState::Running { task_id: None });

        let request =
            TaskCreateRequest::new(query, self.model.clone()).with_max_iterations(self.max_iterations);
        let task_id = match self.backend.create_task(&session_id, &request).await {
            Ok(response) => response.task_id,
            Err(e) => {
                warn!(error = %e, "task creation failed");
                self.set_task(TaskState::Idle);
                self.notify(&format!("task creation failed: {e}"), Severity::Error);
                return Err(e.into());
            }
        };

        match self.backend.open_events(&task_id).await {
            Ok(stream) => {
                info!(task_id = %task_id, "task running");
                self.stream = Some(stream);
                self.set_task(TaskState::Running {
                    task_id: Some(task_id),
                });
                Ok(true)
            }
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "event subscription failed");
                self.set_task(TaskState::Idle);
                self.notify(&format!("event subscription failed: {e}"), Severity::Error);
                Err(e.into())
            }
        }
    }

    /// Ask the backend to stop the running task. Advisory: the task
    /// stays observable until its terminal event arrives on the stream.
    pub async fn stop_task(&mut self) -> Result<bool, EngineError> {
        let TaskState::Running {
            task_id: Some(task_id),
        } = self.task.clone()
        else {
            debug!(state = ?self.task, "stop_task ignored");
            return Ok(false);
        };

        self.set_task(TaskState::Stopping {
            task_id: task_id.clone(),
        });
        match self.backend.stop_task(&task_id).await {
            Ok(()) => {
                info!(task_id = %task_id, "stop requested");
                self.notify("stop requested; waiting for the task to wind down", Severity::Info);
                Ok(true)
            }
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "stop request failed");
                self.set_task(TaskState::Running {
                    task_id: Some(task_id),
                });
                self.notify(&format!("stop request failed: {e}"), Severity::Error);
                Err(e.into())
            }
        }
    }

    // ── Stream pumping ──

    /// Drive the open event stream by one step. Call in a loop while
    /// the task is active; safe to call any time.
    pub async fn pump(&mut self) -> Result<PumpOutcome, EngineError> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(PumpOutcome::Idle);
        };

        match stream.next().await {
            Some(Ok(raw)) => {
                let terminal = terminal_outcome(&raw);
                let changed = self.run.ingest(raw);
                if changed {
                    self.emit_view();
                }
                if let Some(outcome) = terminal {
                    self.finish_run(outcome);
                    return Ok(PumpOutcome::Terminal);
                }
                Ok(PumpOutcome::Event)
            }
            Some(Err(e)) => {
                self.fail_run(&format!("event stream failed: {e}"));
                Ok(PumpOutcome::Terminal)
            }
            None => {
                if self.task.is_active() {
                    self.fail_run("event stream closed before the task ended");
                    Ok(PumpOutcome::Terminal)
                } else {
                    self.stream = None;
                    Ok(PumpOutcome::Idle)
                }
            }
        }
    }

    /// Whether `pump` has anything left to drive.
    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    // ── Internal transitions ──

    fn finish_run(&mut self, outcome: RunOutcome) {
        self.stream = None;
        self.set_task(TaskState::Idle);
        match outcome {
            RunOutcome::Finished => self.notify("task finished", Severity::Success),
            RunOutcome::Errored(message) => {
                self.notify(&format!("task failed: {message}"), Severity::Error)
            }
        }
    }

    /// The stream itself broke. Per the lifecycle rules this ends the
    /// run exactly as a task error would.
    fn fail_run(&mut self, message: &str) {
        warn!(message, "run aborted");
        self.stream = None;
        self.set_task(TaskState::Idle);
        self.notify(message, Severity::Error);
    }

    fn set_session(&mut self, state: SessionState) {
        if self.session != state {
            self.session = state;
            for obs in &mut self.observers {
                obs.on_session_state_changed(&self.session);
            }
        }
    }

    fn set_task(&mut self, state: TaskState) {
        if self.task != state {
            self.task = state;
            for obs in &mut self.observers {
                obs.on_task_state_changed(&self.task);
            }
        }
    }

    fn emit_view(&mut self) {
        let records = self.run.records();
        for obs in &mut self.observers {
            obs.on_view_model_changed(records);
        }
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        for obs in &mut self.observers {
            obs.on_notify(message, severity);
        }
    }
}

enum RunOutcome {
    Finished,
    Errored(String),
}

/// Inspect a raw event for run termination before it is ingested.
fn terminal_outcome(raw: &RawEvent) -> Option<RunOutcome> {
    if !raw.is_terminal() {
        return None;
    }
    if raw.event_type == saga_core::event::TASK_ERROR {
        let message = raw
            .data_str(&["error", "message", "detail"])
            .unwrap_or("unknown error")
            .to_string();
        Some(RunOutcome::Errored(message))
    } else {
        Some(RunOutcome::Finished)
    }
}
