//! Detection of Slack's own redeliveries.
//!
//! Slack retries an event up to three times when the first delivery is not
//! acknowledged in time, tagging each attempt with `X-Slack-Retry-Num` and
//! `X-Slack-Retry-Reason`. A retry always refers to an event already accepted
//! or in flight, so it is acknowledged without further work.

use axum::http::HeaderMap;

use super::parsing::get_header_value;

pub const HEADER_RETRY_NUM: &str = "x-slack-retry-num";
pub const HEADER_RETRY_REASON: &str = "x-slack-retry-reason";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryInfo {
    pub attempt: Option<u32>,
    pub reason: Option<String>,
}

/// Returns the retry details if the request is a platform redelivery.
#[must_use]
pub fn retry_info(headers: &HeaderMap) -> Option<RetryInfo> {
    let num = get_header_value(headers, HEADER_RETRY_NUM);
    let reason = get_header_value(headers, HEADER_RETRY_REASON);

    if num.is_none() && reason.is_none() {
        return None;
    }

    Some(RetryInfo {
        attempt: num.and_then(|n| n.trim().parse().ok()),
        reason: reason.map(ToString::to_string),
    })
}

#[must_use]
pub fn is_retry(headers: &HeaderMap) -> bool {
    retry_info(headers).is_some()
}
