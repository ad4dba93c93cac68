//! Access token inspection.
//!
//! Tokens are never verified here; the payload segment is only decoded so the
//! client can tell when a token is about to lapse and refresh it first.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Seconds before `exp` at which a token is already treated as expired.
/// Covers clock skew and requests that are in flight when the token lapses.
pub const DEFAULT_SKEW_SECONDS: i64 = 10;

/// URL-safe alphabet, tolerant of both padded and unpadded segments.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims carried in the payload segment of an access token.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// The `exp` claim as Unix seconds, if present and numeric.
    pub fn exp(&self) -> Option<f64> {
        self.0.get("exp").and_then(Value::as_f64)
    }

    /// The `exp` claim as a timestamp (for display)
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp()
            .and_then(|exp| DateTime::from_timestamp(exp.trunc() as i64, 0))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Decode the claims of a `header.payload.signature` token.
///
/// Returns `None` for anything that is not three segments with a base64url
/// JSON object in the middle.
pub fn decode(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let bytes = SEGMENT_ENGINE.decode(payload).ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => Some(Claims(map)),
        _ => None,
    }
}

/// Check whether `token` is expired or will expire within `skew_seconds`.
pub fn is_expired(token: &str, skew_seconds: i64) -> bool {
    is_expired_at(token, Utc::now().timestamp(), skew_seconds)
}

/// Same as [`is_expired`] with an explicit current time.
///
/// Undecodable tokens and tokens without a usable `exp` count as expired.
pub fn is_expired_at(token: &str, now: i64, skew_seconds: i64) -> bool {
    match decode(token).and_then(|claims| claims.exp()) {
        // exp of 0 is treated like a missing claim
        Some(exp) if exp != 0.0 => exp <= now.saturating_add(skew_seconds) as f64,
        _ => true,
    }
}
