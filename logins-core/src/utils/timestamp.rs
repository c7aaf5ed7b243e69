//! Microsecond timestamp helpers.
//!
//! Login usage metadata is stored as microseconds since the Unix epoch.
//! Provides custom Serde support for those fields:
//! - Serialization: `Timestamp` -> integer microseconds
//! - Deserialization: integer microseconds or RFC3339 string -> `Timestamp`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Microseconds since the Unix epoch.
pub type Timestamp = u64;

/// Current wall-clock time in microseconds.
pub fn now_micros() -> Timestamp {
    from_datetime(&Utc::now())
}

/// Converts a `DateTime<Utc>` into microseconds, clamping pre-epoch values to zero.
pub fn from_datetime(dt: &DateTime<Utc>) -> Timestamp {
    u64::try_from(dt.timestamp_micros()).unwrap_or(0)
}

/// Converts microseconds back into a `DateTime<Utc>` for display.
pub fn to_datetime(ts: Timestamp) -> Option<DateTime<Utc>> {
    i64::try_from(ts).ok().and_then(DateTime::from_timestamp_micros)
}

/// Next value for a timestamp that must only move forward.
///
/// Returns `now` unless it would not be strictly greater than `previous`.
pub fn advance(previous: Timestamp, now: Timestamp) -> Timestamp {
    now.max(previous.saturating_add(1))
}

/// Serializes a `Timestamp` as integer microseconds.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn serialize<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(*ts)
}

/// Deserializes a `Timestamp` from integer microseconds or an RFC3339 string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MicrosOrString {
        U64(u64),
        String(String),
    }

    match MicrosOrString::deserialize(deserializer)? {
        MicrosOrString::U64(ts) => Ok(ts),
        MicrosOrString::String(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| from_datetime(&dt.with_timezone(&Utc)))
            .map_err(|e| Error::custom(format!("Invalid RFC3339 timestamp: {e}"))),
    }
}
