//! Date extraction helpers shared by the parsers.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::parsers::ParseError;

static PROSE_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b",
    )
    .expect("prose date regex")
});

static NUMERIC_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("numeric date regex"));

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Reduce a CAAML date or timestamp to its `YYYY-MM-DD` part.
///
/// Accepts `YYYY-MM-DD` (returned unchanged) and `YYYY-MM-DDTHH:MM:SS` with
/// an optional `Z` or offset. Idempotent.
pub fn truncate_to_date(s: &str) -> &str {
    let s = s.trim();
    s.split_once('T').map_or(s, |(date, _)| date)
}

/// Parse a CAAML date or timestamp into a calendar date.
pub fn caaml_date(s: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(truncate_to_date(s), "%Y-%m-%d")
        .map_err(|_| ParseError::Date(s.to_string()))
}

/// First "Month D, YYYY" style date in `text`. Abbreviated month names and
/// ordinal suffixes ("February 24th, 2012") are accepted.
pub fn date_from_prose(text: &str) -> Option<NaiveDate> {
    let caps = PROSE_DATE_RE.captures(text)?;
    let month_prefix = caps[1].to_ascii_lowercase();
    let month = MONTHS.iter().position(|m| *m == month_prefix)? as u32 + 1;
    let day = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// First US-style `M/D/YYYY` date in `text`.
pub fn date_from_numeric(text: &str) -> Option<NaiveDate> {
    let caps = NUMERIC_DATE_RE.captures(text)?;
    let month = caps[1].parse().ok()?;
    let day = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Local calendar date of an epoch-millisecond instant.
pub fn date_from_epoch_millis(millis: &str, tz: Tz) -> Option<NaiveDate> {
    let millis: i64 = millis.trim().parse().ok()?;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.with_timezone(&tz).date_naive())
}

/// Local calendar date of an RFC 2822 timestamp (RSS `pubDate`).
pub fn date_from_rfc2822(s: &str, tz: Tz) -> Option<NaiveDate> {
    DateTime::parse_from_rfc2822(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&tz).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_truncate_to_date() {
        assert_eq!(truncate_to_date("2012-02-02T18:14:00"), "2012-02-02");
        assert_eq!(truncate_to_date("2012-02-10T00:00:00Z"), "2012-02-10");
        assert_eq!(truncate_to_date("2012-02-02"), "2012-02-02");
        assert_eq!(truncate_to_date(truncate_to_date("2012-02-02T18:14:00")), "2012-02-02");
    }

    #[test]
    fn test_caaml_date() {
        assert_eq!(caaml_date("2012-02-16T00:00:00-07:00").unwrap(), ymd(2012, 2, 16));
        assert!(matches!(caaml_date("Thursday"), Err(ParseError::Date(_))));
    }

    #[test]
    fn test_date_from_prose() {
        assert_eq!(date_from_prose("February 24, 2012 at 11:19AM"), Some(ymd(2012, 2, 24)));
        assert_eq!(date_from_prose("February 24th, 2012 at 11:19AM"), Some(ymd(2012, 2, 24)));
        assert_eq!(date_from_prose("Issued Sunday, Feb. 3rd 2013"), Some(ymd(2013, 2, 3)));
        assert_eq!(date_from_prose("December 1st, 2013"), Some(ymd(2013, 12, 1)));
        assert_eq!(date_from_prose("February 30, 2012"), None);
        assert_eq!(date_from_prose("no date here"), None);
    }

    #[test]
    fn test_date_from_numeric() {
        assert_eq!(date_from_numeric("1/9/2013 Avalanche Advisory"), Some(ymd(2013, 1, 9)));
        assert_eq!(date_from_numeric("13/1/2013"), None);
    }

    #[test]
    fn test_date_from_epoch_millis_uses_local_zone() {
        // 2012-02-24T19:19:00Z, 11:19 in Vancouver
        assert_eq!(
            date_from_epoch_millis("1330111140000", chrono_tz::America::Vancouver),
            Some(ymd(2012, 2, 24))
        );
        // 2012-02-25T03:00:00Z is still the 24th in Vancouver
        assert_eq!(
            date_from_epoch_millis("1330138800000", chrono_tz::America::Vancouver),
            Some(ymd(2012, 2, 24))
        );
        assert_eq!(date_from_epoch_millis("soon", chrono_tz::America::Vancouver), None);
    }

    #[test]
    fn test_date_from_rfc2822() {
        assert_eq!(
            date_from_rfc2822("Sat, 08 Mar 2014 06:30:00 -0800", chrono_tz::America::Los_Angeles),
            Some(ymd(2014, 3, 8))
        );
        assert_eq!(date_from_rfc2822("yesterday", chrono_tz::America::Los_Angeles), None);
    }
}
