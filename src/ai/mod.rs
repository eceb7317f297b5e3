//! Summarization service access

pub mod client;

use async_trait::async_trait;

use crate::errors::SlackError;

pub use client::{SummarizerApiClient, estimate_tokens};

/// Turns a block of conversation text into a summary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SummarizerClient: Send + Sync {
    /// # Errors
    ///
    /// Returns `SlackError::SummarizerError` when the service is unreachable,
    /// answers with a non-success status, or its body lacks the answer.
    async fn summarize(&self, text: &str, user: &str) -> Result<String, SlackError>;
}
