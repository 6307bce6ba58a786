use anyhow::Context;
use dotenvy::dotenv;
use media_jobs::config::settings::AppConfig;
use media_jobs::infrastructure::process::TokioCommandRunner;
use media_jobs::{app, state::AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting server...");

    let config = AppConfig::new();
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", config.upload_dir.display()))?;

    let runner = Arc::new(TokioCommandRunner::new(config.job_timeout()));
    let addr = format!("0.0.0.0:{}", config.server_port);
    let app = app::create_app(AppState::new(config, runner));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
