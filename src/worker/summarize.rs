use std::sync::Arc;

use tracing::{error, info, warn};

use super::deliver::deliver_reply;
use crate::ai::SummarizerClient;
use crate::core::models::{ChannelMessage, SummaryJob, SummaryResult};
use crate::slack::ChatClient;
use crate::slack::response_builder::{
    format_failure_notice, format_no_messages_reply, format_summary_reply,
};

/// Turns Slack history (newest first) into summarizer input: plain user
/// messages only, oldest first, one per line.
#[must_use]
pub fn build_summary_input(messages: Vec<ChannelMessage>) -> String {
    messages
        .into_iter()
        .rev()
        .filter(ChannelMessage::is_plain_user_message)
        .map(|msg| msg.text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fetch → summarize → post, for one job. Runs off the request path.
pub struct SummarizationPipeline {
    chat: Arc<dyn ChatClient>,
    summarizer: Arc<dyn SummarizerClient>,
}

impl SummarizationPipeline {
    #[must_use]
    pub fn new(chat: Arc<dyn ChatClient>, summarizer: Arc<dyn SummarizerClient>) -> Self {
        Self { chat, summarizer }
    }

    /// Runs the job to completion. Never panics on upstream failures; every
    /// failure is reported in the result and, where possible, posted as a
    /// notice to the channel.
    pub async fn run(&self, job: &SummaryJob) -> SummaryResult {
        let history = match self.chat.fetch_history(&job.channel, &job.window).await {
            Ok(history) => history,
            Err(e) => {
                error!(error = %e, "Failed to fetch channel history");
                return self
                    .notify_failure(job, format!("history fetch failed: {e}"))
                    .await;
            }
        };

        let fetched = history.len();
        let input = build_summary_input(history);
        if input.is_empty() {
            info!(fetched, "No user messages in window");
            let reply = format_no_messages_reply(&job.requesting_user);
            return self.post(job, reply).await;
        }

        info!(fetched, input_chars = input.len(), "Summarizing channel history");
        let summary = match self.summarizer.summarize(&input, &job.requesting_user).await {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Summarizer call failed");
                return self.notify_failure(job, format!("summarizer failed: {e}")).await;
            }
        };

        let reply = format_summary_reply(&job.requesting_user, &summary);
        self.post(job, reply).await
    }

    async fn post(&self, job: &SummaryJob, reply: String) -> SummaryResult {
        match deliver_reply(self.chat.as_ref(), &job.channel, &reply).await {
            Ok(()) => SummaryResult::succeeded(reply),
            Err(e) => SummaryResult::failed(reply, format!("delivery failed: {e}")),
        }
    }

    async fn notify_failure(&self, job: &SummaryJob, detail: String) -> SummaryResult {
        let notice = format_failure_notice(&job.requesting_user);
        if let Err(e) = deliver_reply(self.chat.as_ref(), &job.channel, &notice).await {
            warn!(error = %e, "Failure notice could not be delivered either");
            return SummaryResult::failed(notice, format!("{detail}; notice delivery failed: {e}"));
        }
        SummaryResult::failed(notice, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockSummarizerClient;
    use crate::core::models::TimeWindow;
    use crate::errors::SlackError;
    use crate::slack::MockChatClient;
    use chrono::{Duration, Utc};

    fn msg(ts: &str, user: Option<&str>, subtype: Option<&str>, text: &str) -> ChannelMessage {
        ChannelMessage {
            ts: ts.to_string(),
            user: user.map(ToString::to_string),
            subtype: subtype.map(ToString::to_string),
            text: text.to_string(),
        }
    }

    /// Three plain messages interleaved with two subtype messages, newest first.
    fn mixed_history() -> Vec<ChannelMessage> {
        vec![
            msg("5.0", Some("U3"), None, "third"),
            msg("4.0", Some("U9"), Some("channel_join"), "<@U9> has joined the channel"),
            msg("3.0", Some("U2"), None, "second"),
            msg("2.0", None, Some("bot_message"), "deploy finished"),
            msg("1.0", Some("U1"), None, "first"),
        ]
    }

    fn job() -> SummaryJob {
        let now = Utc::now();
        SummaryJob::new("C1", "U1", TimeWindow::new(now - Duration::hours(3), now))
    }

    fn pipeline(chat: MockChatClient, summarizer: MockSummarizerClient) -> SummarizationPipeline {
        SummarizationPipeline::new(Arc::new(chat), Arc::new(summarizer))
    }

    #[test]
    fn test_build_summary_input_orders_and_filters() {
        assert_eq!(build_summary_input(mixed_history()), "first\nsecond\nthird");
    }

    #[test]
    fn test_build_summary_input_empty() {
        assert_eq!(build_summary_input(Vec::new()), "");
        assert_eq!(
            build_summary_input(vec![msg("1.0", None, Some("channel_join"), "joined")]),
            ""
        );
    }

    #[tokio::test]
    async fn test_run_success_posts_summary() {
        let mut chat = MockChatClient::new();
        chat.expect_fetch_history()
            .withf(|channel, _| channel == "C1")
            .times(1)
            .returning(|_, _| Ok(mixed_history()));
        chat.expect_post_message()
            .withf(|channel, text| {
                channel == "C1" && text.starts_with("<@U1>") && text.contains("All good.")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut summarizer = MockSummarizerClient::new();
        summarizer
            .expect_summarize()
            .withf(|text, user| text == "first\nsecond\nthird" && user == "U1")
            .times(1)
            .returning(|_, _| Ok("All good.".to_string()));

        let result = pipeline(chat, summarizer).run(&job()).await;

        assert!(result.success);
        assert_eq!(result.failure_detail, None);
        assert!(result.text.contains("All good."));
    }

    #[tokio::test]
    async fn test_run_no_messages_skips_summarizer() {
        let mut chat = MockChatClient::new();
        chat.expect_fetch_history().returning(|_, _| Ok(Vec::new()));
        chat.expect_post_message()
            .withf(|_, text| text.contains("no messages"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut summarizer = MockSummarizerClient::new();
        summarizer.expect_summarize().never();

        let result = pipeline(chat, summarizer).run(&job()).await;

        assert!(result.success);
        assert!(result.text.contains("no messages"));
    }

    #[tokio::test]
    async fn test_run_summarizer_failure_posts_notice() {
        let mut chat = MockChatClient::new();
        chat.expect_fetch_history().returning(|_, _| Ok(mixed_history()));
        chat.expect_post_message()
            .withf(|_, text| text.contains("couldn't generate a summary"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut summarizer = MockSummarizerClient::new();
        summarizer.expect_summarize().returning(|_, _| {
            Err(SlackError::SummarizerError(
                "status 500 Internal Server Error: boom".to_string(),
            ))
        });

        let result = pipeline(chat, summarizer).run(&job()).await;

        assert!(!result.success);
        let detail = result.failure_detail.unwrap();
        assert!(!detail.is_empty());
        assert!(detail.contains("summarizer failed"));
    }

    #[tokio::test]
    async fn test_run_missing_answer_is_failure() {
        let mut chat = MockChatClient::new();
        chat.expect_fetch_history().returning(|_, _| Ok(mixed_history()));
        chat.expect_post_message().returning(|_, _| Ok(()));

        let mut summarizer = MockSummarizerClient::new();
        summarizer.expect_summarize().returning(|_, _| {
            crate::ai::client::parse_summary_response(
                reqwest::StatusCode::OK,
                r#"{"event":"message"}"#,
            )
        });

        let result = pipeline(chat, summarizer).run(&job()).await;

        assert!(!result.success);
        assert!(result.failure_detail.is_some_and(|d| d.contains("answer")));
    }

    #[tokio::test]
    async fn test_run_history_failure_posts_notice_without_summarizing() {
        let mut chat = MockChatClient::new();
        chat.expect_fetch_history()
            .returning(|_, _| Err(SlackError::ApiError("channel_not_found".to_string())));
        chat.expect_post_message()
            .withf(|_, text| text.contains("couldn't generate a summary"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut summarizer = MockSummarizerClient::new();
        summarizer.expect_summarize().never();

        let result = pipeline(chat, summarizer).run(&job()).await;

        assert!(!result.success);
        assert!(
            result
                .failure_detail
                .is_some_and(|d| d.contains("history fetch failed"))
        );
    }

    #[tokio::test]
    async fn test_run_delivery_failure_reported() {
        let mut chat = MockChatClient::new();
        chat.expect_fetch_history().returning(|_, _| Ok(mixed_history()));
        chat.expect_post_message()
            .times(1)
            .returning(|_, _| Err(SlackError::ApiError("not_in_channel".to_string())));

        let mut summarizer = MockSummarizerClient::new();
        summarizer
            .expect_summarize()
            .returning(|_, _| Ok("summary".to_string()));

        let result = pipeline(chat, summarizer).run(&job()).await;

        assert!(!result.success);
        assert!(
            result
                .failure_detail
                .is_some_and(|d| d.contains("delivery failed") && d.contains("not_in_channel"))
        );
    }
}
