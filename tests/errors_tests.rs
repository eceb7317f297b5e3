use std::error::Error;
use slack_digest::errors::SlackError;

#[test]
fn test_slack_error_implements_error_trait() {
    fn assert_error<T: Error + Send + Sync + 'static>(_: &T) {}

    let error = SlackError::ParseError("test error".to_string());
    assert_error(&error);
}

#[test]
fn test_slack_error_display() {
    let error = SlackError::ApiError("channel_not_found".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to access Slack API: channel_not_found"
    );

    let error = SlackError::SummarizerError("status 502 Bad Gateway".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to access summarizer API: status 502 Bad Gateway"
    );

    let error = SlackError::HttpError("Connection error".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to send HTTP request: Connection error"
    );

    let error = SlackError::ConfigError("SLACK_BOT_TOKEN: not set".to_string());
    assert_eq!(
        format!("{error}"),
        "Invalid configuration: SLACK_BOT_TOKEN: not set"
    );
}

#[test]
fn test_slack_error_from_conversions() {
    let err = anyhow::anyhow!("test error");
    let slack_err: SlackError = err.into();

    match slack_err {
        SlackError::ApiError(msg) => assert!(msg.contains("test error")),
        other => panic!("Unexpected error type: {other:?}"),
    }

    let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    assert!(matches!(SlackError::from(json_err), SlackError::ParseError(_)));

    // Compile-time check that the reqwest conversion exists.
    #[allow(unused)]
    #[allow(clippy::items_after_statements)]
    fn _check_reqwest_conversion(err: reqwest::Error) -> SlackError {
        SlackError::from(err)
    }
}
