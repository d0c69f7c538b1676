//! Permissive timestamp parsing
//!
//! Exports mix several timestamp layouts, sometimes within one file. Every
//! accepted layout resolves to UTC: offset-bearing values are converted, naive
//! values and values with a trailing zone abbreviation are read as UTC.

use crate::error::PipelineError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive date-time layouts, tried in order
const NAIVE_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    // Legacy Takeout: "Jan 5, 2024, 10:15:00 AM"
    "%b %d, %Y, %I:%M:%S %p",
];

/// Offset-bearing layouts RFC 3339 does not cover
const OFFSET_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

/// Parse a raw timestamp under any recognized layout
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, PipelineError> {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return Err(PipelineError::UnparseableTimestamp(raw.to_string()));
    }

    if let Some(ts) = parse_with_offset(&cleaned) {
        return Ok(ts);
    }
    if let Some(ts) = parse_naive(&cleaned) {
        return Ok(ts);
    }
    if let Some(stripped) = strip_zone_abbreviation(&cleaned) {
        if let Some(ts) = parse_naive(stripped) {
            return Ok(ts);
        }
    }

    Err(PipelineError::UnparseableTimestamp(raw.to_string()))
}

/// Trim and replace the non-breaking spaces newer exports put before AM/PM
fn clean(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '\u{202f}' | '\u{a0}' => ' ',
            other => other,
        })
        .collect()
}

fn parse_with_offset(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

fn parse_naive(s: &str) -> Option<DateTime<Utc>> {
    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// "2024-01-05 10:15:00 UTC" -> "2024-01-05 10:15:00"
fn strip_zone_abbreviation(s: &str) -> Option<&str> {
    let (head, last) = s.rsplit_once(' ')?;
    let is_zone = last.len() >= 2
        && last.chars().all(|c| c.is_ascii_alphabetic())
        && !last.eq_ignore_ascii_case("AM")
        && !last.eq_ignore_ascii_case("PM");
    if is_zone {
        Some(head.trim_end())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_rfc3339_variants() {
        assert_eq!(
            parse_timestamp("2024-01-15T14:02:11Z").unwrap(),
            utc(2024, 1, 15, 14, 2, 11)
        );
        let with_millis = parse_timestamp("2024-01-15T14:02:11.123Z").unwrap();
        assert_eq!(with_millis.timestamp_millis() % 1000, 123);
        assert_eq!(
            parse_timestamp("2024-01-15T15:02:11+01:00").unwrap(),
            utc(2024, 1, 15, 14, 2, 11)
        );
    }

    #[test]
    fn test_compact_offset() {
        assert_eq!(
            parse_timestamp("2024-01-15T09:02:11-0500").unwrap(),
            utc(2024, 1, 15, 14, 2, 11)
        );
    }

    #[test]
    fn test_naive_layouts_are_utc() {
        assert_eq!(
            parse_timestamp("2024-01-15T14:02:11").unwrap(),
            utc(2024, 1, 15, 14, 2, 11)
        );
        assert_eq!(
            parse_timestamp("2024-01-15 14:02:11.5").unwrap().timestamp(),
            utc(2024, 1, 15, 14, 2, 11).timestamp()
        );
        assert_eq!(
            parse_timestamp("2024-01-15 14:02").unwrap(),
            utc(2024, 1, 15, 14, 2, 0)
        );
        assert_eq!(parse_timestamp("2024-01-15").unwrap(), utc(2024, 1, 15, 0, 0, 0));
    }

    #[test]
    fn test_legacy_takeout_layout() {
        assert_eq!(
            parse_timestamp("Jan 5, 2024, 10:15:00 PM PST").unwrap(),
            utc(2024, 1, 5, 22, 15, 0)
        );
        assert_eq!(
            parse_timestamp("Jan 5, 2024, 10:15:00\u{202f}AM").unwrap(),
            utc(2024, 1, 5, 10, 15, 0)
        );
    }

    #[test]
    fn test_trailing_utc_label() {
        assert_eq!(
            parse_timestamp("2024-01-15 14:02:11 UTC").unwrap(),
            utc(2024, 1, 15, 14, 2, 11)
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        for raw in ["", "   ", "yesterday", "2024-13-45T00:00:00Z", "15/01/2024 10:00"] {
            assert!(
                matches!(
                    parse_timestamp(raw),
                    Err(PipelineError::UnparseableTimestamp(_))
                ),
                "expected {raw:?} to be rejected"
            );
        }
    }
}
