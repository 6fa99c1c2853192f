//! Parsing of store timestamps into UTC instants.
//!
//! Stores hand back `collected_at` either as RFC 3339 or as the naive text a
//! `CAST(ts AS VARCHAR)` produces (`2024-05-01 12:00:00.123`). Naive forms
//! are read as UTC.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Earliest instant accepted by default: 2000-01-01T00:00:00Z.
pub fn default_min_valid() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(946_684_800, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn parse(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse and reject anything before `min_valid`.
pub fn parse_valid(text: &str, min_valid: DateTime<Utc>) -> Option<DateTime<Utc>> {
    parse(text).filter(|ts| *ts >= min_valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_with_offset() {
        let ts = parse("2024-05-01T21:00:00+09:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn naive_store_text() {
        let ts = parse("2024-05-01 12:00:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        let ts = parse("2024-05-01 12:00:00.250").unwrap();
        assert_eq!(ts.timestamp_subsec_millis(), 250);
        assert!(parse("2024-05-01T12:00:00").is_some());
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("yesterday"), None);
        assert_eq!(parse("2024-13-01 00:00:00"), None);
    }

    #[test]
    fn before_min_valid_is_dropped() {
        assert_eq!(parse_valid("1970-01-01T00:00:00Z", default_min_valid()), None);
        assert!(parse_valid("2000-01-01T00:00:00Z", default_min_valid()).is_some());
    }
}
