//! Best-effort parsing of feed publication dates
//!
//! Feeds in the wild publish dates in RFC 2822 (RSS), RFC 3339 (Atom) and a
//! long tail of ad-hoc layouts. Strings carrying an offset keep it, so the
//! calendar date seen by filters and buckets is the one the publisher meant.
//! Naive strings are read as UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
];

// Month-first before day-first for ambiguous numeric dates
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Parse a raw published-date string, returning `None` when no known layout fits
pub fn parse_published(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt);
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| naive.and_utc().fixed_offset());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_rfc2822_keeps_offset() {
        let dt = parse_published("Tue, 10 Sep 2024 22:15:00 -0300").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -3 * 3600);
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2024, 9, 10).unwrap());
        assert_eq!(dt.hour(), 22);
    }

    #[test]
    fn test_rfc2822_named_zone() {
        let dt = parse_published("Mon, 01 Jan 2024 08:00:00 GMT").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!(dt.day(), 1);
    }

    #[test]
    fn test_rfc3339() {
        let dt = parse_published("2024-03-01T12:30:00+02:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(dt.month(), 3);
    }

    #[test]
    fn test_naive_layouts_are_utc() {
        let dt = parse_published("2024-03-01 12:30:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!(dt.minute(), 30);

        let dt = parse_published(" 2023-12-01 ").unwrap();
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_ambiguous_numeric_date_is_month_first() {
        let dt = parse_published("02/03/2024").unwrap();
        assert_eq!((dt.month(), dt.day()), (2, 3));

        // Not a valid month, falls back to day-first
        let dt = parse_published("25/12/2024").unwrap();
        assert_eq!((dt.month(), dt.day()), (12, 25));
    }

    #[test]
    fn test_unparseable() {
        assert!(parse_published("").is_none());
        assert!(parse_published("   ").is_none());
        assert!(parse_published("Unknown date").is_none());
        assert!(parse_published("yesterday").is_none());
        assert!(parse_published("2024-13-45").is_none());
    }
}
