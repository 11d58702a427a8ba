//! Persisted timestamp text
//!
//! Both stores hold timestamps as `yyyy-MM-dd HH:mm:ss` text, so anything
//! below one second is lost on a save/load cycle.

use chrono::{NaiveDateTime, Timelike};

use crate::errors::{Result, TaskVaultError};

/// Format used in both the metadata document and the content table
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Compact format used inside identity keys
pub const KEY_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const ACCEPTED_FORMATS: [&str; 4] = [
    TIMESTAMP_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Render a timestamp in the persisted format
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse persisted timestamp text, discarding any fractional seconds
///
/// # Errors
///
/// Returns `MalformedTimestamp` naming `field` when no accepted format matches.
pub fn parse_timestamp(field: &str, value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(truncate_to_second)
        .ok_or_else(|| TaskVaultError::MalformedTimestamp {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// Drop sub-second precision
pub fn truncate_to_second(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0).unwrap_or(ts)
}
