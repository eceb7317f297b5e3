use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::Value;

use crate::core::models::{EventKind, InboundEvent};
use crate::errors::SlackError;

/// `event_callback` envelope; only the fields the dispatcher reads.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    event_id: Option<String>,
    #[serde(default)]
    event: Option<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    event_ts: Option<String>,
}

/// What a verified request body turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlackPayload {
    UrlVerification { challenge: String },
    EventCallback(InboundEvent),
    /// Any other envelope type (e.g. `app_rate_limited`).
    Unsupported(String),
}

/// Parses a Slack Events API body.
///
/// # Errors
///
/// Returns `SlackError::ParseError` if the body is not JSON, a handshake lacks
/// its challenge, or an `event_callback` lacks `event_id` or `event`.
pub fn parse_payload(body: &[u8]) -> Result<SlackPayload, SlackError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| SlackError::ParseError(format!("Invalid JSON payload: {e}")))?;

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    // The handshake is answered from `challenge` alone; nothing else in the body is interpreted.
    if kind == "url_verification" {
        let challenge = value
            .get("challenge")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SlackError::ParseError("url_verification without challenge".to_string())
            })?;
        return Ok(SlackPayload::UrlVerification {
            challenge: challenge.to_string(),
        });
    }

    if kind != "event_callback" {
        return Ok(SlackPayload::Unsupported(kind));
    }

    let envelope: RawEnvelope = serde_json::from_value(value)
        .map_err(|e| SlackError::ParseError(format!("Invalid event_callback: {e}")))?;
    let event_id = envelope
        .event_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| SlackError::ParseError("Missing event_id".to_string()))?;
    let event = envelope
        .event
        .ok_or_else(|| SlackError::ParseError("Missing event".to_string()))?;

    Ok(SlackPayload::EventCallback(InboundEvent {
        event_id,
        kind: EventKind::from_type(event.kind.as_deref().unwrap_or_default()),
        channel: event.channel.unwrap_or_default(),
        user: event.user.unwrap_or_default(),
        text: event.text.unwrap_or_default(),
        raw_timestamp: event.ts.or(event.event_ts).unwrap_or_default(),
    }))
}

/// Case-insensitive header lookup; non-UTF-8 values are treated as absent.
pub fn get_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
