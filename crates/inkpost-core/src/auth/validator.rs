//! Session expiry parsing and comparison.
//!
//! The canonical stored format is RFC 3339 in UTC (see [`format_expiry`]).
//! Older or server-provided values are accepted in a few other shapes, all
//! interpreted as UTC when they carry no offset.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a stored expiry value into a UTC timestamp.
pub fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    // Epoch milliseconds
    if value.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(millis) = value.parse::<i64>() {
            return Utc.timestamp_millis_opt(millis).single();
        }
    }

    None
}

/// Canonical representation written to the session store.
pub fn format_expiry(expires_at: DateTime<Utc>) -> String {
    expires_at.to_rfc3339()
}

/// True when `expires_in` is present, parseable and not earlier than `now`.
pub fn is_session_valid_at(expires_in: Option<&str>, now: DateTime<Utc>) -> bool {
    match expires_in.and_then(parse_expiry) {
        Some(expires_at) => now <= expires_at,
        None => false,
    }
}

/// [`is_session_valid_at`] against the current time.
pub fn is_session_valid(expires_in: Option<&str>) -> bool {
    is_session_valid_at(expires_in, Utc::now())
}
