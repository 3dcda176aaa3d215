use saga_backend::{Backend, HttpBackend};

pub async fn execute(backend_url: &str) -> anyhow::Result<()> {
    let backend = HttpBackend::new(backend_url);
    let health = backend.health().await?;
    println!("{}  {}", health.status, health.timestamp);
    Ok(())
}
