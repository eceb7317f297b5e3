//! Slack digest - a Slack bot that summarizes today's channel history on mention.
//!
//! When the bot is `@`-mentioned, Slack delivers an `app_mention` event to the
//! webhook. The request is verified, de-duplicated and acknowledged right away;
//! a background job then fetches the channel's messages since local midnight,
//! sends them to the summarization service and posts the result back.
//!
//! # Architecture
//!
//! - [`api`] verifies and dispatches Slack Events API requests (axum)
//! - [`worker`] runs summary jobs detached from the request (Tokio tasks)
//! - [`slack`] wraps `conversations.history` and `chat.postMessage` (slack-morphism)
//! - [`ai`] calls the summarizer's `chat-messages` endpoint (reqwest)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use slack_digest::ai::SummarizerApiClient;
//! use slack_digest::api::{AppState, build_router};
//! use slack_digest::core::config::AppConfig;
//! use slack_digest::slack::SlackClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     slack_digest::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let chat = Arc::new(SlackClient::new(config.slack_bot_token.clone()));
//!     let summarizer = Arc::new(SummarizerApiClient::new(
//!         &config.summarizer_base_url,
//!         config.summarizer_api_key.clone(),
//!         config.summarizer_app_id.clone(),
//!     )?);
//!
//!     let app = build_router(AppState::new(&config, chat, summarizer));
//!     let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod ai;
pub mod api;
pub mod core;
pub mod errors;
pub mod slack;
pub mod worker;

pub use errors::SlackError;

/// Configure structured JSON logging.
///
/// The level filter comes from `RUST_LOG` and defaults to `info`. Calling this
/// more than once is harmless; only the first call installs the subscriber.
///
/// # Example
///
/// ```
/// slack_digest::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
