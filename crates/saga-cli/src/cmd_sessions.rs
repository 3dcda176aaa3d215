use saga_backend::{Backend, HttpBackend};

pub async fn list(backend_url: &str) -> anyhow::Result<()> {
    let backend = HttpBackend::new(backend_url);
    let sessions = backend.list_sessions().await?;
    if sessions.is_empty() {
        println!("no sessions");
        return Ok(());
    }
    for s in sessions {
        println!("{}  {:10}  {}", s.session_id, s.status, s.repo_url);
    }
    Ok(())
}

pub async fn close(backend_url: &str, session_id: &str) -> anyhow::Result<()> {
    let backend = HttpBackend::new(backend_url);
    backend.close_session(session_id).await?;
    println!("closed {session_id}");
    Ok(())
}
