mod cmd_health;
mod cmd_run;
mod cmd_sessions;
mod cmd_tasks;
mod observer;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "saga", version, about = "Watch a remote coding agent work on your repository")]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, default_value = "http://127.0.0.1:8000")]
    backend: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect a repository, submit a task, and stream its execution
    Run {
        /// Repository URL (https://host/owner/repo)
        repo: String,
        /// What the agent should do
        query: String,
        /// Model identifier passed through to the backend
        #[arg(long)]
        model: Option<String>,
        /// Cap on agent loop iterations
        #[arg(long)]
        max_iterations: Option<u32>,
    },
    /// List sessions known to the backend
    Sessions,
    /// List tasks known to the backend
    Tasks,
    /// Close a session on the backend
    Close {
        /// Session ID
        session_id: String,
    },
    /// Check backend health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("SAGA_LOG")
                .unwrap_or_else(|_| "saga=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Run {
            repo,
            query,
            model,
            max_iterations,
        } => {
            cmd_run::execute(
                &cli.backend,
                &repo,
                &query,
                model.as_deref(),
                max_iterations,
            )
            .await
        }
        Command::Sessions => cmd_sessions::list(&cli.backend).await,
        Command::Tasks => cmd_tasks::execute(&cli.backend).await,
        Command::Close { session_id } => cmd_sessions::close(&cli.backend, &session_id).await,
        Command::Health => cmd_health::execute(&cli.backend).await,
    }
}
