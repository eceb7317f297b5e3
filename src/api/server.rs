//! HTTP server wiring.
//!
//! # Endpoints
//!
//! - `POST /slack/events` - Slack Events API webhook
//! - `GET /` - liveness check
//! - `GET /slack/today_summary`, `GET /slack/test_message` - manual checks,
//!   mounted only when debug routes are enabled

use std::sync::Arc;

use axum::Json;
use chrono_tz::Tz;
use serde_json::{Value, json};

use super::dedup::EventDeduplicator;
use super::debug::{test_message_handler, today_summary_handler};
use super::handler::{WebhookDispatcher, events_handler};
use super::signature::SignatureVerifier;
use crate::ai::SummarizerClient;
use crate::core::config::AppConfig;
use crate::slack::ChatClient;
use crate::worker::{JobLauncher, SummarizationPipeline, TokioJobLauncher};

pub const HEALTH_MESSAGE: &str = "Slack Summary API is running";

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    dispatcher: WebhookDispatcher,
    pipeline: Arc<SummarizationPipeline>,
    chat: Arc<dyn ChatClient>,
    default_channel_id: String,
    timezone: Tz,
    enable_debug_routes: bool,
}

impl AppState {
    /// Builds the state with jobs spawned on the Tokio runtime.
    #[must_use]
    pub fn new(
        config: &AppConfig,
        chat: Arc<dyn ChatClient>,
        summarizer: Arc<dyn SummarizerClient>,
    ) -> Self {
        let pipeline = Arc::new(SummarizationPipeline::new(Arc::clone(&chat), summarizer));
        let launcher = Arc::new(TokioJobLauncher::new(Arc::clone(&pipeline)));
        Self::assemble(config, chat, pipeline, launcher)
    }

    /// Same as [`AppState::new`] but with a caller-supplied launcher.
    #[must_use]
    pub fn with_launcher(
        config: &AppConfig,
        chat: Arc<dyn ChatClient>,
        summarizer: Arc<dyn SummarizerClient>,
        launcher: Arc<dyn JobLauncher>,
    ) -> Self {
        let pipeline = Arc::new(SummarizationPipeline::new(Arc::clone(&chat), summarizer));
        Self::assemble(config, chat, pipeline, launcher)
    }

    fn assemble(
        config: &AppConfig,
        chat: Arc<dyn ChatClient>,
        pipeline: Arc<SummarizationPipeline>,
        launcher: Arc<dyn JobLauncher>,
    ) -> Self {
        let dispatcher = WebhookDispatcher::new(
            SignatureVerifier::new(config.slack_signing_secret.clone(), config.signature_tolerance),
            EventDeduplicator::new(config.dedup_ttl, config.dedup_capacity),
            launcher,
            config.summary_timezone,
        );

        AppState {
            inner: Arc::new(AppStateInner {
                dispatcher,
                pipeline,
                chat,
                default_channel_id: config.slack_default_channel_id.clone(),
                timezone: config.summary_timezone,
                enable_debug_routes: config.enable_debug_routes,
            }),
        }
    }

    pub fn dispatcher(&self) -> &WebhookDispatcher {
        &self.inner.dispatcher
    }

    pub fn pipeline(&self) -> &SummarizationPipeline {
        &self.inner.pipeline
    }

    pub fn chat(&self) -> &dyn ChatClient {
        self.inner.chat.as_ref()
    }

    pub fn default_channel_id(&self) -> &str {
        &self.inner.default_channel_id
    }

    pub fn timezone(&self) -> Tz {
        self.inner.timezone
    }

    pub fn debug_routes_enabled(&self) -> bool {
        self.inner.enable_debug_routes
    }
}

/// `GET /`
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "message": HEALTH_MESSAGE }))
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    let mut router = axum::Router::new()
        .route("/", get(health_handler))
        .route("/slack/events", post(events_handler));

    if app_state.debug_routes_enabled() {
        router = router
            .route("/slack/today_summary", get(today_summary_handler))
            .route("/slack/test_message", get(test_message_handler));
    }

    router.with_state(app_state)
}
