use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use prompt_chain::client::CompletionClient;
use prompt_chain::server::upload::UploadConfig;
use prompt_chain::server::{self, AppState};

/// LLM prompt-chain HTTP service: task decomposition and diary sentiment.
#[derive(Parser, Debug)]
#[command(name = "prompt-chain", version)]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Directory for uploaded files.
    #[arg(long, default_value = "uploads")]
    uploads_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Fail fast: without a credential the pipelines cannot serve.
    let client = Arc::new(CompletionClient::from_env()?);
    info!(model = client.model(), "completion client ready");

    let state = AppState::new(client, UploadConfig::new(args.uploads_dir));
    let app = server::router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
