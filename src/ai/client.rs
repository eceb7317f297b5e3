//! Summarizer API client module
//!
//! Talks to a Dify-style `chat-messages` endpoint in blocking mode: the
//! conversation text goes in as the `query`, the summary comes back as the
//! `answer` field.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use url::Url;

use super::SummarizerClient;
use crate::errors::SlackError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_INPUT_TOKENS: usize = 100_000;
const ERROR_BODY_SNIPPET_CHARS: usize = 300;

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// Keeps the newest lines of `text` that fit in `max_tokens`.
///
/// The input is chronological, so the tail is the most recent part of the conversation.
#[must_use]
pub fn truncate_to_budget(text: &str, max_tokens: usize) -> &str {
    if estimate_tokens(text) <= max_tokens {
        return text;
    }

    let max_chars = max_tokens.saturating_sub(1) * 4;
    let total_chars = text.chars().count();
    let skip_chars = total_chars.saturating_sub(max_chars);
    let cut = text
        .char_indices()
        .nth(skip_chars)
        .map_or(text.len(), |(idx, _)| idx);
    let tail = &text[cut..];

    // Drop the partial first line so the summarizer never sees half a message.
    match tail.find('\n') {
        Some(nl) if cut > 0 && text.as_bytes().get(cut - 1) != Some(&b'\n') => &tail[nl + 1..],
        _ => tail,
    }
}

/// Interprets the summarizer's HTTP response.
///
/// # Errors
///
/// Returns `SlackError::SummarizerError` for non-success statuses, non-JSON
/// bodies, and bodies without a non-empty string `answer`.
pub fn parse_summary_response(status: StatusCode, body: &str) -> Result<String, SlackError> {
    if !status.is_success() {
        let snippet: String = body.chars().take(ERROR_BODY_SNIPPET_CHARS).collect();
        return Err(SlackError::SummarizerError(format!(
            "status {status}: {snippet}"
        )));
    }

    let response_json: Value = serde_json::from_str(body)
        .map_err(|e| SlackError::SummarizerError(format!("Failed to parse response: {e}")))?;

    let answer = response_json
        .get("answer")
        .and_then(Value::as_str)
        .ok_or_else(|| SlackError::SummarizerError("Response has no `answer` field".to_string()))?;

    if answer.trim().is_empty() {
        return Err(SlackError::SummarizerError("Empty `answer`".to_string()));
    }

    Ok(answer.to_string())
}

/// HTTP client for the summarization service.
pub struct SummarizerApiClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    app_id: String,
}

impl SummarizerApiClient {
    /// # Errors
    ///
    /// Returns an error if the endpoint URL cannot be derived from `base_url`
    /// or the HTTP client cannot be built.
    pub fn new(base_url: &Url, api_key: String, app_id: String) -> Result<Self, SlackError> {
        let endpoint = Self::endpoint_for(base_url)?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SlackError::HttpError(format!("Failed to build summarizer client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            api_key,
            app_id,
        })
    }

    fn endpoint_for(base_url: &Url) -> Result<Url, SlackError> {
        // `Url::join` would drop the last path segment of a base without a trailing slash.
        let raw = format!("{}/chat-messages", base_url.as_str().trim_end_matches('/'));
        Url::parse(&raw).map_err(|e| SlackError::ConfigError(format!("summarizer endpoint: {e}")))
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn build_request_body(&self, text: &str, user: &str) -> Value {
        json!({
            "inputs": { "app_id": self.app_id },
            "query": text,
            "user": user,
            "response_mode": "blocking",
        })
    }
}

#[async_trait]
impl SummarizerClient for SummarizerApiClient {
    async fn summarize(&self, text: &str, user: &str) -> Result<String, SlackError> {
        let input = truncate_to_budget(text, MAX_INPUT_TOKENS);
        if input.len() < text.len() {
            warn!(
                original_tokens = estimate_tokens(text),
                kept_tokens = estimate_tokens(input),
                "Conversation exceeds summarizer budget, keeping the most recent messages"
            );
        }

        #[cfg(feature = "debug-logs")]
        debug!("Summarizer input:\n{}", input);

        info!(
            estimated_tokens = estimate_tokens(input),
            "Requesting summary"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&self.build_request_body(input, user))
            .send()
            .await
            .map_err(|e| SlackError::SummarizerError(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            SlackError::SummarizerError(format!("Failed to read response (status {status}): {e}"))
        })?;

        debug!(status = %status, body_len = body.len(), "Summarizer responded");
        parse_summary_response(status, &body)
    }
}
