use tracing::{error, info};

use crate::errors::SlackError;
use crate::slack::ChatClient;

/// Posts `text` to `channel`, logging the outcome. Delivery is attempted once.
///
/// # Errors
///
/// Returns the chat client's error if the post fails.
pub async fn deliver_reply(
    chat: &dyn ChatClient,
    channel: &str,
    text: &str,
) -> Result<(), SlackError> {
    match chat.post_message(channel, text).await {
        Ok(()) => {
            info!(channel = %channel, "Reply delivered");
            Ok(())
        }
        Err(e) => {
            error!(channel = %channel, error = %e, "Failed to deliver reply");
            Err(e)
        }
    }
}
