//! Text of the messages the bot posts back to a channel.
//!
//! Every reply opens with a mention of the user who asked, so the requester
//! is notified even when several summaries land in the same channel.

/// Canonical failure message shown to users when summarization fails.
pub const CANONICAL_FAILURE_MESSAGE: &str =
    "Sorry, I couldn't generate a summary at this time. Please try again later.";

/// Shown instead of calling the summarizer when the window has no user messages.
pub const NO_MESSAGES_MESSAGE: &str = "There are no messages to summarize today.";

/// Fixed message posted by the manual test route.
pub const TEST_MESSAGE: &str = "Test message from the summary bot.";

#[must_use]
pub fn mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

/// Reply carrying a successful summary.
///
/// # Examples
///
/// ```
/// use slack_digest::slack::response_builder::format_summary_reply;
///
/// let reply = format_summary_reply("U123", "Release is on track.");
/// assert!(reply.starts_with("<@U123>"));
/// assert!(reply.ends_with("Release is on track."));
/// ```
#[must_use]
pub fn format_summary_reply(user_id: &str, summary: &str) -> String {
    format!(
        "{} here is today's summary:\n\n{}",
        mention(user_id),
        summary.trim()
    )
}

#[must_use]
pub fn format_no_messages_reply(user_id: &str) -> String {
    format!("{} {NO_MESSAGES_MESSAGE}", mention(user_id))
}

/// User-visible failure notice. Internal error details are logged, never posted.
#[must_use]
pub fn format_failure_notice(user_id: &str) -> String {
    format!("{} {CANONICAL_FAILURE_MESSAGE}", mention(user_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_reply_mentions_user_and_embeds_summary() {
        let reply = format_summary_reply("U12345", "  *Highlights*\n- shipped v2\n");

        assert_eq!(
            reply,
            "<@U12345> here is today's summary:\n\n*Highlights*\n- shipped v2"
        );
    }

    #[test]
    fn test_no_messages_reply() {
        assert_eq!(
            format_no_messages_reply("U1"),
            "<@U1> There are no messages to summarize today."
        );
    }

    #[test]
    fn test_failure_notice_is_marked() {
        let notice = format_failure_notice("U1");

        assert!(notice.starts_with("<@U1>"));
        assert!(notice.contains("couldn't generate a summary"));
    }
}
