use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Event kinds the dispatcher distinguishes. Anything else is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    UrlVerification,
    AppMention,
    Other(String),
}

impl EventKind {
    #[must_use]
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "url_verification" => EventKind::UrlVerification,
            "app_mention" => EventKind::AppMention,
            other => EventKind::Other(other.to_string()),
        }
    }
}

/// A verified, parsed `event_callback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub event_id: String,
    pub kind: EventKind,
    pub channel: String,
    pub user: String,
    pub text: String,
    pub raw_timestamp: String,
}

/// Half-open interval `[start, end)` of channel history to summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// From local midnight of `now`'s calendar day in `tz` up to `now`.
    #[must_use]
    pub fn start_of_day_until(now: DateTime<Utc>, tz: Tz) -> Self {
        let local_date = now.with_timezone(&tz).date_naive();
        let midnight = local_date.and_time(NaiveTime::MIN);

        // Some zones skip midnight on DST changes; the first valid instant after it is used instead.
        let start = tz
            .from_local_datetime(&midnight)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
            .map_or(now - Duration::hours(24), |dt| dt.with_timezone(&Utc));

        Self { start, end: now }
    }

    /// Slack `ts` value for the window start (`oldest`).
    #[must_use]
    pub fn oldest_ts(&self) -> String {
        slack_ts(self.start)
    }

    /// Slack `ts` value for the window end (`latest`).
    #[must_use]
    pub fn latest_ts(&self) -> String {
        slack_ts(self.end)
    }
}

fn slack_ts(at: DateTime<Utc>) -> String {
    format!("{}.{:06}", at.timestamp(), at.timestamp_subsec_micros())
}

/// A single history entry, reduced to what summarization needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub ts: String,
    pub user: Option<String>,
    pub subtype: Option<String>,
    pub text: String,
}

impl ChannelMessage {
    /// Plain user-authored message: no subtype, has an author, has text.
    #[must_use]
    pub fn is_plain_user_message(&self) -> bool {
        self.subtype.is_none() && self.user.is_some() && !self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryJob {
    pub correlation_id: String,
    pub channel: String,
    pub requesting_user: String,
    pub window: TimeWindow,
}

impl SummaryJob {
    #[must_use]
    pub fn new(channel: &str, requesting_user: &str, window: TimeWindow) -> Self {
        Self {
            correlation_id: uuid::Uuid::new_v4().to_string(),
            channel: channel.to_string(),
            requesting_user: requesting_user.to_string(),
            window,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryResult {
    pub text: String,
    pub success: bool,
    pub failure_detail: Option<String>,
}

impl SummaryResult {
    #[must_use]
    pub fn succeeded(text: String) -> Self {
        Self {
            text,
            success: true,
            failure_detail: None,
        }
    }

    #[must_use]
    pub fn failed(text: String, detail: String) -> Self {
        Self {
            text,
            success: false,
            failure_detail: Some(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_event_kind_from_type() {
        assert_eq!(EventKind::from_type("app_mention"), EventKind::AppMention);
        assert_eq!(
            EventKind::from_type("url_verification"),
            EventKind::UrlVerification
        );
        assert_eq!(
            EventKind::from_type("reaction_added"),
            EventKind::Other("reaction_added".to_string())
        );
    }

    #[test]
    fn test_start_of_day_utc() {
        let now = utc("2024-05-10T15:30:00Z");
        let window = TimeWindow::start_of_day_until(now, Tz::UTC);

        assert_eq!(window.start, utc("2024-05-10T00:00:00Z"));
        assert_eq!(window.end, now);
    }

    #[test]
    fn test_start_of_day_uses_local_calendar_day() {
        // 23:30 UTC on the 9th is already the 10th in Tokyo (UTC+9).
        let now = utc("2024-05-09T23:30:00Z");
        let window = TimeWindow::start_of_day_until(now, chrono_tz::Asia::Tokyo);

        assert_eq!(window.start, utc("2024-05-09T15:00:00Z"));
    }

    #[test]
    fn test_start_of_day_skipped_midnight() {
        // Santiago moved clocks forward at 00:00 on 2022-09-11.
        let now = utc("2022-09-11T12:00:00Z");
        let window = TimeWindow::start_of_day_until(now, chrono_tz::America::Santiago);

        assert!(window.start < now);
        assert!(now - window.start < Duration::hours(24));
    }

    #[test]
    fn test_slack_ts_format() {
        let window = TimeWindow::new(
            utc("2024-05-10T00:00:00Z"),
            utc("2024-05-10T00:00:01.5Z"),
        );

        assert_eq!(window.oldest_ts(), "1715299200.000000");
        assert_eq!(window.latest_ts(), "1715299201.500000");
    }

    #[test]
    fn test_plain_user_message() {
        let plain = ChannelMessage {
            ts: "1.0".into(),
            user: Some("U1".into()),
            subtype: None,
            text: "hello".into(),
        };
        assert!(plain.is_plain_user_message());

        let joined = ChannelMessage {
            subtype: Some("channel_join".into()),
            ..plain.clone()
        };
        assert!(!joined.is_plain_user_message());

        let anonymous = ChannelMessage {
            user: None,
            ..plain.clone()
        };
        assert!(!anonymous.is_plain_user_message());

        let blank = ChannelMessage {
            text: "  ".into(),
            ..plain
        };
        assert!(!blank.is_plain_user_message());
    }

    #[test]
    fn test_summary_job_gets_unique_correlation_id() {
        let window = TimeWindow::new(Utc::now(), Utc::now());
        let a = SummaryJob::new("C1", "U1", window);
        let b = SummaryJob::new("C1", "U1", window);

        assert_ne!(a.correlation_id, b.correlation_id);
        assert_eq!(a.channel, "C1");
        assert_eq!(a.requesting_user, "U1");
    }
}
