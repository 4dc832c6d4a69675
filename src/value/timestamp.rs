//! ISO-8601 timestamp parsing and rendering

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};

/// Timestamp type used for cursor values and resolved `timestampValue`s
pub type Timestamp = DateTime<FixedOffset>;

/// Parse an ISO-8601 instant
///
/// A trailing literal `Z` is read as `+00:00`. Values without an offset are
/// taken as UTC, and a bare date means midnight UTC.
pub fn parse_timestamp(value: &str) -> Result<Timestamp> {
    let trimmed = value.trim();
    let normalized = match trimmed.strip_suffix('Z') {
        Some(prefix) => format!("{prefix}+00:00"),
        None => trimmed.to_string(),
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(ts);
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().fixed_offset());
        }
    }

    Err(Error::invalid_timestamp(value, "expected an ISO-8601 instant"))
}

/// Render a timestamp in ISO-8601 with an explicit offset (`+00:00`, never `Z`)
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

#[cfg(test)]
mod timestamp_tests {
    use super::*;

    #[test]
    fn test_parse_zulu_suffix() {
        let ts = parse_timestamp("2024-01-02T10:30:00Z").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-02T10:30:00+00:00");
    }

    #[test]
    fn test_parse_offset() {
        let ts = parse_timestamp("2024-01-02T10:30:00+02:00").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 7200);
        assert_eq!(format_timestamp(&ts), "2024-01-02T10:30:00+02:00");
    }

    #[test]
    fn test_parse_nanoseconds() {
        let ts = parse_timestamp("2024-01-02T10:30:00.123456789Z").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-02T10:30:00.123456789+00:00");
    }

    #[test]
    fn test_parse_naive_and_date() {
        let ts = parse_timestamp("2024-01-02T10:30:00").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-02T10:30:00+00:00");

        let ts = parse_timestamp("2024-01-02").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-02T00:00:00+00:00");
    }

    #[test]
    fn test_parse_invalid() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_format_roundtrip_preserves_instant() {
        let ts = parse_timestamp("2024-03-04T05:06:07.5Z").unwrap();
        let again = parse_timestamp(&format_timestamp(&ts)).unwrap();
        assert_eq!(ts, again);
    }
}
