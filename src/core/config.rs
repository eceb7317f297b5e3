use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use url::Url;

use crate::errors::SlackError;

pub const DEFAULT_SUMMARIZER_BASE_URL: &str = "https://api.dify.ai/v1";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SIGNATURE_TOLERANCE_SECS: u64 = 300;
pub const DEFAULT_DEDUP_TTL_SECS: u64 = 24 * 3600;
pub const DEFAULT_DEDUP_CAPACITY: usize = 100_000;

#[derive(Clone)]
pub struct AppConfig {
    pub slack_bot_token: String,
    pub slack_signing_secret: String,
    pub slack_default_channel_id: String,
    pub summarizer_api_key: String,
    pub summarizer_app_id: String,
    pub summarizer_base_url: Url,
    pub summary_timezone: Tz,
    pub bind_addr: SocketAddr,
    pub signature_tolerance: Duration,
    pub dedup_ttl: Duration,
    pub dedup_capacity: usize,
    pub enable_debug_routes: bool,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("slack_bot_token", &"<redacted>")
            .field("slack_signing_secret", &"<redacted>")
            .field("slack_default_channel_id", &self.slack_default_channel_id)
            .field("summarizer_api_key", &"<redacted>")
            .field("summarizer_app_id", &self.summarizer_app_id)
            .field("summarizer_base_url", &self.summarizer_base_url.as_str())
            .field("summary_timezone", &self.summary_timezone.name())
            .field("bind_addr", &self.bind_addr)
            .field("signature_tolerance", &self.signature_tolerance)
            .field("dedup_ttl", &self.dedup_ttl)
            .field("dedup_capacity", &self.dedup_capacity)
            .field("enable_debug_routes", &self.enable_debug_routes)
            .finish()
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns `SlackError::ConfigError` naming the first missing or invalid variable.
    pub fn from_env() -> Result<Self, SlackError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` is this with `std::env::var`.
    ///
    /// # Errors
    ///
    /// Returns `SlackError::ConfigError` naming the first missing or invalid variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SlackError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SlackError::ConfigError(format!("{key}: not set")))
        };

        let summarizer_base_url = lookup("SUMMARIZER_BASE_URL")
            .unwrap_or_else(|| DEFAULT_SUMMARIZER_BASE_URL.to_string());
        let summarizer_base_url = Url::parse(&summarizer_base_url)
            .map_err(|e| SlackError::ConfigError(format!("SUMMARIZER_BASE_URL: {e}")))?;

        let summary_timezone = match lookup("SUMMARY_TIMEZONE") {
            Some(name) => Tz::from_str(name.trim())
                .map_err(|e| SlackError::ConfigError(format!("SUMMARY_TIMEZONE: {e}")))?,
            None => Tz::UTC,
        };

        let bind_addr = parse_or(&lookup, "BIND_ADDR", || {
            DEFAULT_BIND_ADDR
                .parse()
                .map_err(|e| SlackError::ConfigError(format!("BIND_ADDR: {e}")))
        })?;

        let tolerance_secs = parse_or(&lookup, "SIGNATURE_TOLERANCE_SECS", || {
            Ok(DEFAULT_SIGNATURE_TOLERANCE_SECS)
        })?;
        let dedup_ttl_secs = parse_or(&lookup, "DEDUP_TTL_SECS", || Ok(DEFAULT_DEDUP_TTL_SECS))?;
        let dedup_capacity = parse_or(&lookup, "DEDUP_CAPACITY", || Ok(DEFAULT_DEDUP_CAPACITY))?;
        let enable_debug_routes = parse_or(&lookup, "ENABLE_DEBUG_ROUTES", || Ok(false))?;

        Ok(Self {
            slack_bot_token: required("SLACK_BOT_TOKEN")?,
            slack_signing_secret: required("SLACK_SIGNING_SECRET")?,
            slack_default_channel_id: required("SLACK_DEFAULT_CHANNEL_ID")?,
            summarizer_api_key: required("SUMMARIZER_API_KEY")?,
            summarizer_app_id: required("SUMMARIZER_APP_ID")?,
            summarizer_base_url,
            summary_timezone,
            bind_addr,
            signature_tolerance: Duration::from_secs(tolerance_secs),
            dedup_ttl: Duration::from_secs(dedup_ttl_secs),
            dedup_capacity,
            enable_debug_routes,
        })
    }
}

fn parse_or<F, T, D>(lookup: &F, key: &str, default: D) -> Result<T, SlackError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
    D: FnOnce() -> Result<T, SlackError>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| SlackError::ConfigError(format!("{key}: {e}"))),
        None => default(),
    }
}
