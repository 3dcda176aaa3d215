//! Engine lifecycle tests against a scripted in-memory backend.

use std::sync::{Arc, Mutex};

use serde_json::json;

use saga_backend::{
    Backend, BackendError, EventStream, HealthResponse, SessionCreateRequest, SessionResponse,
    SessionSummary, TaskCreateRequest, TaskResponse, TaskSummary,
};
use saga_core::{RawEvent, RecordKind, ToolStatus};
use saga_engine::{Engine, EngineError, EngineObserver, PumpOutcome, SessionState, Severity, TaskState};

// ── Scripted backend ──

#[derive(Default)]
struct MockBackend {
    fail_create_session: bool,
    fail_create_task: bool,
    fail_stop: bool,
    events: Mutex<Option<Vec<Result<RawEvent, BackendError>>>>,
    stops: Mutex<Vec<String>>,
}

impl MockBackend {
    fn with_events(events: Vec<Result<RawEvent, BackendError>>) -> Self {
        Self {
            events: Mutex::new(Some(events)),
            ..Self::default()
        }
    }
}

fn rejected(detail: &str) -> BackendError {
    BackendError::Rejected {
        status: 500,
        detail: detail.to_string(),
    }
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    async fn create_session(
        &self,
        request: &SessionCreateRequest,
    ) -> Result<SessionResponse, BackendError> {
        if self.fail_create_session {
            return Err(rejected("clone failed"));
        }
        assert!(request.repo_url.starts_with("https://"));
        Ok(SessionResponse {
            session_id: "s-1".into(),
            status: "active".into(),
            repo_owner: "octocat".into(),
            repo_name: "hello-world".into(),
            is_fork: true,
        })
    }

    async fn create_task(
        &self,
        session_id: &str,
        _request: &TaskCreateRequest,
    ) -> Result<TaskResponse, BackendError> {
        if self.fail_create_task {
            return Err(rejected("agent unavailable"));
        }
        assert_eq!(session_id, "s-1");
        Ok(TaskResponse { task_id: "t-1".into() })
    }

    async fn stop_task(&self, task_id: &str) -> Result<(), BackendError> {
        if self.fail_stop {
            return Err(rejected("stop refused"));
        }
        self.stops.lock().unwrap().push(task_id.to_string());
        Ok(())
    }

    async fn open_events(&self, _task_id: &str) -> Result<EventStream, BackendError> {
        let items = self
            .events
            .lock()
            .unwrap()
            .take()
            .expect("event script not set or already consumed");
        Ok(Box::pin(futures_util::stream::iter(items)))
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, BackendError> {
        Ok(Vec::new())
    }

    async fn list_tasks(&self) -> Result<Vec<TaskSummary>, BackendError> {
        Ok(Vec::new())
    }

    async fn close_session(&self, _session_id: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn health(&self) -> Result<HealthResponse, BackendError> {
        Ok(HealthResponse {
            status: "ok".into(),
            timestamp: "t".into(),
        })
    }
}

// ── Observer capture ──

#[derive(Default)]
struct Captured {
    notices: Vec<(String, Severity)>,
    task_states: Vec<TaskState>,
    view_sizes: Vec<usize>,
}

struct Recorder(Arc<Mutex<Captured>>);

impl EngineObserver for Recorder {
    fn on_view_model_changed(&mut self, records: &[saga_core::ProcessedEvent]) {
        self.0.lock().unwrap().view_sizes.push(records.len());
    }

    fn on_task_state_changed(&mut self, state: &TaskState) {
        self.0.lock().unwrap().task_states.push(state.clone());
    }

    fn on_notify(&mut self, message: &str, severity: Severity) {
        self.0
            .lock()
            .unwrap()
            .notices
            .push((message.to_string(), severity));
    }
}

fn ev(event_type: &str, ts: &str, data: serde_json::Value) -> Result<RawEvent, BackendError> {
    Ok(RawEvent::new(event_type, ts, data))
}

fn successful_run() -> Vec<Result<RawEvent, BackendError>> {
    vec![
        ev("task.start", "t0", json!({"query":"fix the bug"})),
        ev("stream.keepalive", "t1", json!({})),
        ev("agent.loop.start", "t2", json!({"iteration":1})),
        ev("llm.thought", "t3", json!({"thought":"read the file first"})),
        ev(
            "llm.tool_call.start",
            "t4",
            json!({"tool":"read_file","params":{"file_path":"src/lib.rs"}}),
        ),
        ev(
            "llm.tool_call.end",
            "t5",
            json!({"tool":"read_file","was_successful":true,"response_preview":"mod foo;"}),
        ),
        ev("task.finish", "t6", json!({"response":"patched"})),
    ]
}

async fn active_engine(backend: MockBackend) -> Engine<MockBackend> {
    let mut engine = Engine::new(backend);
    assert!(engine.create_session("https://github.com/octocat/hello-world").await.unwrap());
    engine
}

// ── Session lifecycle ──

#[tokio::test]
async fn create_session_reaches_active_with_repo_info() {
    let engine = active_engine(MockBackend::default()).await;
    match engine.session_state() {
        SessionState::Active { session_id, repo } => {
            assert_eq!(session_id, "s-1");
            assert_eq!(repo.owner, "octocat");
            assert!(repo.is_fork);
        }
        other => panic!("unexpected state: {other:?}"),
    }
}

#[tokio::test]
async fn create_session_rolls_back_on_backend_failure() {
    let capture = Arc::new(Mutex::new(Captured::default()));
    let mut engine = Engine::new(MockBackend {
        fail_create_session: true,
        ..MockBackend::default()
    });
    engine.add_observer(Box::new(Recorder(capture.clone())));
    let err = engine
        .create_session("https://github.com/octocat/hello-world")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Backend(_)));
    assert_eq!(engine.session_state(), &SessionState::NoSession);
    // The machine is retryable after the rollback.
    assert!(!engine.session_state().is_active());

    // Observer-only frontends learn about the failure too.
    let captured = capture.lock().unwrap();
    let (message, severity) = captured.notices.last().unwrap();
    assert_eq!(*severity, Severity::Error);
    assert!(message.contains("clone failed"));
}

#[tokio::test]
async fn create_session_rejects_bad_urls_without_leaving_no_session() {
    let mut engine = Engine::new(MockBackend::default());
    let err = engine.create_session("not-a-url").await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(engine.session_state(), &SessionState::NoSession);
}

#[tokio::test]
async fn second_create_session_is_a_no_op() {
    let mut engine = active_engine(MockBackend::default()).await;
    assert!(!engine
        .create_session("https://github.com/octocat/other")
        .await
        .unwrap());
    assert_eq!(engine.session_state().session_id(), Some("s-1"));
}

// ── Task lifecycle ──

#[tokio::test]
async fn start_task_requires_an_active_session() {
    let mut engine = Engine::new(MockBackend::default());
    assert!(!engine.start_task("do something").await.unwrap());
    assert!(engine.task_state().is_idle());
}

#[tokio::test]
async fn start_task_rejects_empty_queries() {
    let mut engine = active_engine(MockBackend::with_events(successful_run())).await;
    let err = engine.start_task("   ").await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(engine.task_state().is_idle());
}

#[tokio::test]
async fn start_task_returns_to_idle_when_the_backend_rejects() {
    let capture = Arc::new(Mutex::new(Captured::default()));
    let mut engine = active_engine(MockBackend {
        fail_create_task: true,
        ..MockBackend::default()
    })
    .await;
    engine.add_observer(Box::new(Recorder(capture.clone())));
    assert!(engine.start_task("fix the bug").await.is_err());
    assert!(engine.task_state().is_idle());
    assert!(!engine.has_stream());

    let captured = capture.lock().unwrap();
    let (message, severity) = captured.notices.last().unwrap();
    assert_eq!(*severity, Severity::Error);
    assert!(message.contains("agent unavailable"));
}

#[tokio::test]
async fn start_task_while_running_is_a_no_op() {
    let mut engine = active_engine(MockBackend::with_events(successful_run())).await;
    assert!(engine.start_task("fix the bug").await.unwrap());
    assert!(!engine.start_task("another one").await.unwrap());
    assert_eq!(engine.task_state().task_id(), Some("t-1"));
}

// ── Pumping ──

#[tokio::test]
async fn full_run_builds_the_view_and_returns_to_idle() {
    let capture = Arc::new(Mutex::new(Captured::default()));
    let mut engine = active_engine(MockBackend::with_events(successful_run())).await;
    engine.add_observer(Box::new(Recorder(capture.clone())));
    assert!(engine.start_task("fix the bug").await.unwrap());

    loop {
        match engine.pump().await.unwrap() {
            PumpOutcome::Event => continue,
            PumpOutcome::Terminal => break,
            PumpOutcome::Idle => panic!("stream ended without a terminal event"),
        }
    }

    assert!(engine.task_state().is_idle());
    assert!(!engine.has_stream());

    // keepalive dropped; 5 displayable records in arrival order
    let records = engine.records();
    assert_eq!(records.len(), 5);
    assert!(matches!(records[0].kind, RecordKind::TaskLifecycle { .. }));
    assert!(matches!(records[2].kind, RecordKind::Thought { .. }));
    let tool = records[3].tool_call().unwrap();
    assert_eq!(tool.status, ToolStatus::Completed);
    assert_eq!(tool.output.as_deref(), Some("mod foo;"));

    let captured = capture.lock().unwrap();
    assert_eq!(
        captured.notices.last().map(|(m, s)| (m.as_str(), *s)),
        Some(("task finished", Severity::Success))
    );
    // view sizes only ever grow within a run
    assert!(captured.view_sizes.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn task_error_event_ends_the_run_with_an_error_notice() {
    let events = vec![
        ev("task.start", "t0", json!({"query":"q"})),
        ev("task.error", "t1", json!({"error":"iteration limit reached"})),
    ];
    let capture = Arc::new(Mutex::new(Captured::default()));
    let mut engine = active_engine(MockBackend::with_events(events)).await;
    engine.add_observer(Box::new(Recorder(capture.clone())));
    engine.start_task("q").await.unwrap();

    while engine.pump().await.unwrap() != PumpOutcome::Terminal {}

    assert!(engine.task_state().is_idle());
    let records = engine.records();
    assert!(matches!(&records[1].kind, RecordKind::Error { message } if message.contains("limit")));
    let captured = capture.lock().unwrap();
    assert_eq!(captured.notices.last().unwrap().1, Severity::Error);
}

#[tokio::test]
async fn stream_failure_is_treated_as_a_task_error() {
    let events = vec![
        ev("task.start", "t0", json!({"query":"q"})),
        Err(BackendError::Stream("connection reset".into())),
    ];
    let capture = Arc::new(Mutex::new(Captured::default()));
    let mut engine = active_engine(MockBackend::with_events(events)).await;
    engine.add_observer(Box::new(Recorder(capture.clone())));
    engine.start_task("q").await.unwrap();

    assert_eq!(engine.pump().await.unwrap(), PumpOutcome::Event);
    assert_eq!(engine.pump().await.unwrap(), PumpOutcome::Terminal);
    assert!(engine.task_state().is_idle());
    assert!(!engine.has_stream());

    let captured = capture.lock().unwrap();
    let (message, severity) = captured.notices.last().unwrap();
    assert_eq!(*severity, Severity::Error);
    assert!(message.contains("connection reset"));
    // partial records from before the failure survive
    assert_eq!(engine.records().len(), 1);
}

#[tokio::test]
async fn premature_stream_close_ends_the_run() {
    let events = vec![ev("task.start", "t0", json!({"query":"q"}))];
    let mut engine = active_engine(MockBackend::with_events(events)).await;
    engine.start_task("q").await.unwrap();

    assert_eq!(engine.pump().await.unwrap(), PumpOutcome::Event);
    assert_eq!(engine.pump().await.unwrap(), PumpOutcome::Terminal);
    assert!(engine.task_state().is_idle());
}

#[tokio::test]
async fn pump_without_a_stream_is_idle() {
    let mut engine = Engine::new(MockBackend::default());
    assert_eq!(engine.pump().await.unwrap(), PumpOutcome::Idle);
}

// ── Stopping ──

#[tokio::test]
async fn stop_is_advisory_and_the_run_continues_to_its_terminal_event() {
    let events = vec![
        ev("task.start", "t0", json!({"query":"q"})),
        ev("llm.thought", "t1", json!({"thought":"winding down"})),
        ev("task.finish", "t2", json!({"response":"stopped early"})),
    ];
    let mut engine = active_engine(MockBackend::with_events(events)).await;
    engine.start_task("q").await.unwrap();

    assert!(engine.stop_task().await.unwrap());
    assert!(engine.task_state().is_stopping());

    // Events keep flowing after the stop request.
    assert_eq!(engine.pump().await.unwrap(), PumpOutcome::Event);
    assert_eq!(engine.pump().await.unwrap(), PumpOutcome::Event);
    assert_eq!(engine.pump().await.unwrap(), PumpOutcome::Terminal);
    assert!(engine.task_state().is_idle());
    assert_eq!(engine.records().len(), 3);
}

#[tokio::test]
async fn failed_stop_request_reverts_to_running() {
    let capture = Arc::new(Mutex::new(Captured::default()));
    let mut engine = active_engine(MockBackend {
        fail_stop: true,
        events: Mutex::new(Some(successful_run())),
        ..MockBackend::default()
    })
    .await;
    engine.add_observer(Box::new(Recorder(capture.clone())));
    engine.start_task("q").await.unwrap();

    assert!(engine.stop_task().await.is_err());
    assert_eq!(
        engine.task_state(),
        &TaskState::Running { task_id: Some("t-1".into()) }
    );

    // The revert is announced so the user knows a retry is possible.
    let captured = capture.lock().unwrap();
    let (message, severity) = captured.notices.last().unwrap();
    assert_eq!(*severity, Severity::Error);
    assert!(message.contains("stop request failed"));
}

#[tokio::test]
async fn stop_without_a_running_task_is_a_no_op() {
    let mut engine = Engine::new(MockBackend::default());
    assert!(!engine.stop_task().await.unwrap());
}

// ── Run isolation ──

#[tokio::test]
async fn second_run_starts_from_an_empty_view() {
    let first = vec![
        ev("task.start", "t0", json!({"query":"one"})),
        ev("task.finish", "t1", json!({"response":"done"})),
    ];
    let mut engine = active_engine(MockBackend::with_events(first)).await;
    engine.start_task("one").await.unwrap();
    while engine.pump().await.unwrap() != PumpOutcome::Terminal {}
    assert_eq!(engine.records().len(), 2);

    *engine.backend().events.lock().unwrap() =
        Some(vec![ev("task.start", "t2", json!({"query":"two"}))]);
    engine.start_task("two").await.unwrap();
    assert_eq!(engine.pump().await.unwrap(), PumpOutcome::Event);
    assert_eq!(engine.records().len(), 1);
    assert_eq!(engine.records()[0].timestamp, "t2");
}
