//! All Slack-specific functionality

pub mod client;
pub mod response_builder;

use async_trait::async_trait;

use crate::core::models::{ChannelMessage, TimeWindow};
use crate::errors::SlackError;

// Re-export main types for convenience
pub use client::SlackClient;

/// The two Slack Web API calls the pipeline needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Channel history inside `window`, newest first (Slack's native order).
    ///
    /// # Errors
    ///
    /// Returns an error if Slack is unreachable or answers `ok: false`.
    async fn fetch_history(
        &self,
        channel: &str,
        window: &TimeWindow,
    ) -> Result<Vec<ChannelMessage>, SlackError>;

    /// # Errors
    ///
    /// Returns an error if the message could not be posted.
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackError>;
}
