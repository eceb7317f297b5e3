//! Slack API client module
//!
//! Wraps the two Web API methods the bot uses, `conversations.history` and
//! `chat.postMessage`. Each call is made once; failures are reported to the
//! caller and not retried.

use async_trait::async_trait;
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::{
    SlackApiChatPostMessageRequest, SlackApiConversationsHistoryRequest,
};
use slack_morphism::{
    SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackCursorId, SlackHistoryMessage,
    SlackMessageContent, SlackTs,
};
use tracing::{debug, warn};

use super::ChatClient;
use crate::core::models::{ChannelMessage, TimeWindow};
use crate::errors::SlackError;

/// Page size for `conversations.history` (Slack's documented maximum is 999).
const HISTORY_PAGE_LIMIT: u16 = 200;
/// Upper bound on pages fetched for one window.
const HISTORY_MAX_PAGES: usize = 50;

// Build the Slack client connector safely without panicking.
// If connector construction fails, store None and surface a SlackError at call sites.
static SLACK_CLIENT: std::sync::LazyLock<Option<SlackHyperClient>> =
    std::sync::LazyLock::new(|| match SlackClientHyperConnector::new() {
        Ok(connector) => Some(SlackHyperClient::new(connector)),
        Err(e) => {
            warn!("Failed to create Slack HTTP connector: {}", e);
            None
        }
    });

fn connector() -> Result<&'static SlackHyperClient, SlackError> {
    SLACK_CLIENT
        .as_ref()
        .ok_or_else(|| SlackError::HttpError("Slack HTTP connector not initialized".to_string()))
}

/// Converts a history entry into the pipeline's view of it.
#[must_use]
pub fn to_channel_message(msg: &SlackHistoryMessage) -> ChannelMessage {
    let subtype = msg.subtype.as_ref().map(|subtype| {
        serde_json::to_value(subtype)
            .ok()
            .and_then(|v| v.as_str().map(ToString::to_string))
            .unwrap_or_else(|| format!("{subtype:?}"))
    });

    ChannelMessage {
        ts: msg.origin.ts.0.clone(),
        user: msg.sender.user.as_ref().map(|u| u.0.clone()),
        subtype,
        text: msg.content.text.clone().unwrap_or_default(),
    }
}

/// Slack Web API client authenticated with a bot token
pub struct SlackClient {
    token: SlackApiToken,
}

impl SlackClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
        }
    }

    #[must_use]
    pub fn token(&self) -> &SlackApiToken {
        &self.token
    }

    /// Fetches every message in `window`, following pagination cursors.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn get_channel_history(
        &self,
        channel_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<SlackHistoryMessage>, SlackError> {
        let session = connector()?.open_session(&self.token);
        let mut messages = Vec::new();
        let mut cursor: Option<SlackCursorId> = None;

        for page in 0..HISTORY_MAX_PAGES {
            let mut request = SlackApiConversationsHistoryRequest::new()
                .with_channel(SlackChannelId(channel_id.to_string()))
                .with_oldest(SlackTs(window.oldest_ts()))
                .with_latest(SlackTs(window.latest_ts()))
                .with_limit(HISTORY_PAGE_LIMIT);
            if let Some(c) = cursor.take() {
                request = request.with_cursor(c);
            }

            let result = session.conversations_history(&request).await?;
            debug!(
                channel_id = %channel_id,
                page,
                count = result.messages.len(),
                "Fetched history page"
            );
            messages.extend(result.messages);

            cursor = result
                .response_metadata
                .and_then(|meta| meta.next_cursor)
                .filter(|c| !c.0.is_empty());
            if cursor.is_none() {
                return Ok(messages);
            }
        }

        warn!(
            channel_id = %channel_id,
            pages = HISTORY_MAX_PAGES,
            "History truncated at page limit"
        );
        Ok(messages)
    }

    /// # Errors
    pub async fn post_text(&self, channel_id: &str, message: &str) -> Result<(), SlackError> {
        let session = connector()?.open_session(&self.token);

        let post_req = SlackApiChatPostMessageRequest::new(
            SlackChannelId(channel_id.to_string()),
            SlackMessageContent::new().with_text(message.to_string()),
        );

        session.chat_post_message(&post_req).await?;

        Ok(())
    }
}

#[async_trait]
impl ChatClient for SlackClient {
    async fn fetch_history(
        &self,
        channel: &str,
        window: &TimeWindow,
    ) -> Result<Vec<ChannelMessage>, SlackError> {
        let history = self.get_channel_history(channel, window).await?;
        Ok(history.iter().map(to_channel_message).collect())
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackError> {
        self.post_text(channel, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn history_message(value: serde_json::Value) -> SlackHistoryMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_to_channel_message_plain() {
        let msg = history_message(json!({
            "type": "message",
            "user": "U012AB3CDE",
            "text": "I find you punny and would like to smell your nose letter",
            "ts": "1512085950.000216"
        }));

        let converted = to_channel_message(&msg);

        assert_eq!(converted.ts, "1512085950.000216");
        assert_eq!(converted.user.as_deref(), Some("U012AB3CDE"));
        assert_eq!(converted.subtype, None);
        assert!(converted.is_plain_user_message());
    }

    #[test]
    fn test_to_channel_message_subtype() {
        let msg = history_message(json!({
            "type": "message",
            "subtype": "channel_join",
            "user": "U012AB3CDE",
            "text": "<@U012AB3CDE> has joined the channel",
            "ts": "1512085950.000300"
        }));

        let converted = to_channel_message(&msg);

        assert_eq!(converted.subtype.as_deref(), Some("channel_join"));
        assert!(!converted.is_plain_user_message());
    }

    #[test]
    fn test_token_is_kept() {
        let client = SlackClient::new("xoxb-test".to_string());
        assert_eq!(client.token().token_value.0, "xoxb-test");
    }
}
