//! Slack Events API webhook.
//!
//! Every request walks the same sequence: signature, retry, parse, challenge,
//! dedup, event type, launch. The first step that decides the request ends it.
//! Nothing on this path waits on Slack or the summarizer; accepted mentions
//! are handed to a [`JobLauncher`] and acknowledged at once.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use super::dedup::EventDeduplicator;
use super::helpers::{ack, challenge_response, err_response};
use super::parsing::{SlackPayload, get_header_value, parse_payload};
use super::retry::retry_info;
use super::server::AppState;
use super::signature::{SignatureRejection, SignatureVerifier};
use crate::core::models::{EventKind, SummaryJob, TimeWindow};
use crate::worker::JobLauncher;

pub const HEADER_SIGNATURE: &str = "x-slack-signature";
pub const HEADER_TIMESTAMP: &str = "x-slack-request-timestamp";

/// How a webhook request was disposed of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Signature headers missing or verification failed.
    Rejected(String),
    /// Signed, but the body is not a usable Slack payload.
    BadRequest(String),
    /// Platform redelivery, acknowledged without work.
    Retry,
    /// `url_verification` handshake; carries the challenge to echo.
    Challenge(String),
    /// Event id already seen.
    Duplicate,
    /// Valid event that does not trigger a summary.
    Ignored,
    /// A summary job was launched.
    Accepted { correlation_id: String },
}

impl WebhookOutcome {
    /// Short label used in the acknowledgement body and in logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            WebhookOutcome::Rejected(_) => "rejected",
            WebhookOutcome::BadRequest(_) => "bad_request",
            WebhookOutcome::Retry => "retry",
            WebhookOutcome::Challenge(_) => "challenge",
            WebhookOutcome::Duplicate => "duplicate",
            WebhookOutcome::Ignored => "ignored",
            WebhookOutcome::Accepted { .. } => "accepted",
        }
    }
}

impl IntoResponse for WebhookOutcome {
    fn into_response(self) -> Response {
        match &self {
            WebhookOutcome::Rejected(reason) => err_response(StatusCode::UNAUTHORIZED, reason),
            WebhookOutcome::BadRequest(reason) => err_response(StatusCode::BAD_REQUEST, reason),
            WebhookOutcome::Challenge(challenge) => challenge_response(challenge),
            WebhookOutcome::Retry
            | WebhookOutcome::Duplicate
            | WebhookOutcome::Ignored
            | WebhookOutcome::Accepted { .. } => ack(self.label()),
        }
    }
}

/// Per-request state machine for the events endpoint.
pub struct WebhookDispatcher {
    verifier: SignatureVerifier,
    dedup: EventDeduplicator,
    launcher: Arc<dyn JobLauncher>,
    timezone: Tz,
}

impl WebhookDispatcher {
    #[must_use]
    pub fn new(
        verifier: SignatureVerifier,
        dedup: EventDeduplicator,
        launcher: Arc<dyn JobLauncher>,
        timezone: Tz,
    ) -> Self {
        Self {
            verifier,
            dedup,
            launcher,
            timezone,
        }
    }

    #[must_use]
    pub fn deduplicator(&self) -> &EventDeduplicator {
        &self.dedup
    }

    /// Decides what to do with one request. `now` drives both the replay
    /// check and the summary window.
    pub fn dispatch(&self, headers: &HeaderMap, body: &[u8], now: DateTime<Utc>) -> WebhookOutcome {
        let (Some(timestamp), Some(signature)) = (
            get_header_value(headers, HEADER_TIMESTAMP),
            get_header_value(headers, HEADER_SIGNATURE),
        ) else {
            warn!("Request missing Slack signature headers");
            return WebhookOutcome::Rejected("missing signature headers".to_string());
        };

        if let Err(rejection) = self.verifier.verify(timestamp, body, signature, now) {
            match &rejection {
                SignatureRejection::StaleTimestamp { skew_secs } => {
                    warn!(skew_secs, "Rejected request with stale timestamp");
                }
                other => warn!(reason = %other, "Rejected request signature"),
            }
            return WebhookOutcome::Rejected(rejection.to_string());
        }

        if let Some(retry) = retry_info(headers) {
            info!(
                retry_num = retry.attempt,
                retry_reason = retry.reason.as_deref().unwrap_or_default(),
                "Acknowledging Slack retry without processing"
            );
            return WebhookOutcome::Retry;
        }

        let payload = match parse_payload(body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Unparseable webhook body");
                return WebhookOutcome::BadRequest(e.to_string());
            }
        };

        let event = match payload {
            SlackPayload::UrlVerification { challenge } => {
                info!("Answering url_verification challenge");
                return WebhookOutcome::Challenge(challenge);
            }
            SlackPayload::Unsupported(kind) => {
                debug!(payload_type = %kind, "Ignoring unsupported payload type");
                return WebhookOutcome::Ignored;
            }
            SlackPayload::EventCallback(event) => event,
        };

        if !self.dedup.should_process(&event.event_id) {
            info!(event_id = %event.event_id, "Duplicate event");
            return WebhookOutcome::Duplicate;
        }

        if event.kind != EventKind::AppMention {
            debug!(event_id = %event.event_id, kind = ?event.kind, "Ignoring non-mention event");
            return WebhookOutcome::Ignored;
        }

        if event.channel.is_empty() || event.user.is_empty() {
            warn!(event_id = %event.event_id, "Mention without channel or user");
            return WebhookOutcome::Ignored;
        }

        let window = TimeWindow::start_of_day_until(now, self.timezone);
        let job = SummaryJob::new(&event.channel, &event.user, window);
        let correlation_id = job.correlation_id.clone();
        info!(
            event_id = %event.event_id,
            correlation_id = %correlation_id,
            channel = %event.channel,
            user = %event.user,
            "Launching summary job"
        );
        self.launcher.launch(job);

        WebhookOutcome::Accepted { correlation_id }
    }
}

/// `POST /slack/events`
///
/// # Response
///
/// - 200 OK: challenge echo, or `{"ok": true, "status": ...}` acknowledgement
/// - 400 Bad Request: signed body that is not a Slack payload
/// - 401 Unauthorized: missing or invalid signature
#[tracing::instrument(level = "info", skip_all, fields(body_len = body.len()))]
pub async fn events_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookOutcome {
    let outcome = app_state.dispatcher().dispatch(&headers, &body, Utc::now());
    info!(outcome = outcome.label(), "Webhook handled");
    outcome
}
