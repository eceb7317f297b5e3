//! Slack request signing (`X-Slack-Signature`, version `v0`).
//!
//! Slack signs `v0:<timestamp>:<raw body>` with HMAC-SHA256 keyed by the app's
//! signing secret and sends `v0=<lowercase hex>`. Verification must run over
//! the body bytes exactly as received.

use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_VERSION: &str = "v0";

const SHA256_HEX_LEN: usize = 64;

fn signing_mac(timestamp: &str, body: &[u8], secret: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Some(mac)
}

/// Computes the `v0=<hex>` signature Slack would send for this request.
#[must_use]
pub fn compute_signature(timestamp: &str, body: &[u8], signing_secret: &str) -> String {
    match signing_mac(timestamp, body, signing_secret) {
        Some(mac) => format!(
            "{SIGNATURE_VERSION}={}",
            hex::encode(mac.finalize().into_bytes())
        ),
        None => String::new(),
    }
}

/// Parses `v0=<hex>` into the raw digest. Only lowercase hex of the full
/// SHA-256 length is accepted, so two spellings never verify the same digest.
fn parse_signature(signature: &str) -> Option<Vec<u8>> {
    let hex_sig = signature
        .strip_prefix(SIGNATURE_VERSION)?
        .strip_prefix('=')?;

    if hex_sig.len() != SHA256_HEX_LEN
        || !hex_sig
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return None;
    }

    hex::decode(hex_sig).ok()
}

/// Verifies a Slack signature over the raw request body.
///
/// Returns `false` for any mismatch or malformed input and never panics.
/// The digest comparison is constant-time.
#[must_use]
pub fn verify_slack_signature(
    timestamp: &str,
    body: &[u8],
    provided_signature: &str,
    signing_secret: &str,
) -> bool {
    let Some(provided) = parse_signature(provided_signature) else {
        return false;
    };
    let Some(mac) = signing_mac(timestamp, body, signing_secret) else {
        return false;
    };

    mac.verify_slice(&provided).is_ok()
}

/// Why a request failed verification. Never carries the secret or the signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureRejection {
    #[error("request timestamp is not a unix timestamp")]
    MalformedTimestamp,

    #[error("request timestamp is {skew_secs}s away from server time")]
    StaleTimestamp { skew_secs: i64 },

    #[error("signature mismatch")]
    Mismatch,
}

/// Signature verification plus the replay window check.
#[derive(Clone)]
pub struct SignatureVerifier {
    signing_secret: String,
    tolerance: Duration,
}

impl SignatureVerifier {
    #[must_use]
    pub fn new(signing_secret: impl Into<String>, tolerance: Duration) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            tolerance,
        }
    }

    /// # Errors
    ///
    /// Returns the rejection reason when the timestamp is malformed or outside
    /// the tolerance window around `now`, or when the signature does not match.
    pub fn verify(
        &self,
        timestamp: &str,
        body: &[u8],
        provided_signature: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SignatureRejection> {
        let ts = timestamp
            .trim()
            .parse::<i64>()
            .map_err(|_| SignatureRejection::MalformedTimestamp)?;

        let skew_secs = now.timestamp().saturating_sub(ts);
        let tolerance = i64::try_from(self.tolerance.as_secs()).unwrap_or(i64::MAX);
        if skew_secs.saturating_abs() > tolerance {
            return Err(SignatureRejection::StaleTimestamp { skew_secs });
        }

        if verify_slack_signature(timestamp, body, provided_signature, &self.signing_secret) {
            Ok(())
        } else {
            Err(SignatureRejection::Mismatch)
        }
    }
}
