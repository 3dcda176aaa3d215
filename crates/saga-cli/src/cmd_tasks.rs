use saga_backend::{Backend, HttpBackend};

pub async fn execute(backend_url: &str) -> anyhow::Result<()> {
    let backend = HttpBackend::new(backend_url);
    let tasks = backend.list_tasks().await?;
    if tasks.is_empty() {
        println!("no tasks");
        return Ok(());
    }
    for t in tasks {
        println!(
            "{}  {:10}  {}  session={}  \"{}\"",
            t.task_id, t.status, t.started_at, t.session_id, t.query
        );
    }
    Ok(())
}
