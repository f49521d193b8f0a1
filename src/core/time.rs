//! UTC timestamp helpers
//!
//! Every timestamp the runtime writes (envelopes, signals) uses the same
//! second-precision ISO-8601 "Z" form, e.g. `2025-01-31T12:00:00Z`.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current UTC time in `YYYY-MM-DDTHH:MM:SSZ` form
pub fn iso_now() -> String {
    iso_timestamp(Utc::now())
}

/// Format a UTC time in `YYYY-MM-DDTHH:MM:SSZ` form
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Check a string has the exact envelope timestamp shape
pub fn is_iso_timestamp(value: &str) -> bool {
    value.len() == 20
        && value.ends_with('Z')
        && DateTime::parse_from_rfc3339(value).is_ok()
        && value.as_bytes()[10] == b'T'
}
