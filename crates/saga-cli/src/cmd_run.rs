use saga_backend::HttpBackend;
use saga_engine::{Engine, PumpOutcome};
use tracing::warn;

use crate::observer::ConsoleObserver;

pub async fn execute(
    backend_url: &str,
    repo: &str,
    query: &str,
    model: Option<&str>,
    max_iterations: Option<u32>,
) -> anyhow::Result<()> {
    let mut engine = Engine::new(HttpBackend::new(backend_url));
    if let Some(model) = model {
        engine = engine.with_model(model);
    }
    if let Some(n) = max_iterations {
        engine = engine.with_max_iterations(n);
    }
    engine.add_observer(Box::new(ConsoleObserver::new()));

    engine.create_session(repo).await?;
    engine.start_task(query).await?;

    let mut stop_requested = false;
    loop {
        tokio::select! {
            outcome = engine.pump() => match outcome? {
                PumpOutcome::Event => {}
                PumpOutcome::Terminal | PumpOutcome::Idle => break,
            },
            _ = tokio::signal::ctrl_c(), if !stop_requested => {
                stop_requested = true;
                // Advisory: keep draining the stream until the backend
                // winds the task down. A second Ctrl-C kills us anyway.
                if let Err(e) = engine.stop_task().await {
                    warn!(error = %e, "stop request failed; still streaming");
                }
            }
        }
    }
    Ok(())
}
