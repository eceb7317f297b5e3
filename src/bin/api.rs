use std::sync::Arc;

use anyhow::Context;
use slack_digest::ai::SummarizerApiClient;
use slack_digest::api::{AppState, build_router};
use slack_digest::core::config::AppConfig;
use slack_digest::slack::SlackClient;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    slack_digest::setup_logging();

    let config = AppConfig::from_env().context("loading configuration")?;
    info!(config = ?config, "Configuration loaded");

    let chat = Arc::new(SlackClient::new(config.slack_bot_token.clone()));
    let summarizer = Arc::new(SummarizerApiClient::new(
        &config.summarizer_base_url,
        config.summarizer_api_key.clone(),
        config.summarizer_app_id.clone(),
    )?);

    let app = build_router(AppState::new(&config, chat, summarizer));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
