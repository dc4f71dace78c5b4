//! Structural validation of parsed forecasts.
//!
//! Applied to every parser's output regardless of source format. Only
//! forecasts that pass are ever installed into the canonical result.

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, warn};

use crate::forecast::models::{ForecastDay, NO_RATING};

/// Regions that structurally never issue a numeric rating.
pub const NO_RATING_REGIONS: &[&str] = &["cacb_northrockies"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("forecast is empty")]
    Empty,
    #[error("dates are not consecutive at entry {index}")]
    NotConsecutive { index: usize },
    #[error("forecast mixes unrated and rated days")]
    MixedRating,
}

pub fn is_no_rating_region(region_id: &str) -> bool {
    NO_RATING_REGIONS.contains(&region_id)
}

/// Check a forecast against the structural invariants:
/// - non-empty, unless the region is in the no-rating exception set
/// - each date is exactly one day after the previous one
/// - either every level is 0, or none is
pub fn validate(region_id: &str, forecast: Option<&[ForecastDay]>) -> Result<(), ValidationError> {
    let days = match forecast {
        Some(days) if !days.is_empty() => days,
        _ if is_no_rating_region(region_id) => return Ok(()),
        _ => return Err(ValidationError::Empty),
    };

    for (i, pair) in days.windows(2).enumerate() {
        if pair[0].date.succ_opt() != Some(pair[1].date) {
            return Err(ValidationError::NotConsecutive { index: i + 1 });
        }
    }

    let unrated = days.iter().filter(|d| d.avi_level == NO_RATING).count();
    if unrated != 0 && unrated != days.len() {
        return Err(ValidationError::MixedRating);
    }

    Ok(())
}

/// [`validate`], logging a rejection. `strict` only affects how loudly.
pub fn validate_logged(
    region_id: &str,
    forecast: Option<&[ForecastDay]>,
    strict: bool,
) -> Result<(), ValidationError> {
    validate(region_id, forecast).map_err(|e| {
        if strict {
            warn!(region = region_id, error = %e, "Forecast failed validation");
        } else {
            debug!(region = region_id, error = %e, "Forecast failed validation");
        }
        e
    })
}

/// Boolean form of [`validate_logged`].
pub fn is_structurally_valid(region_id: &str, forecast: Option<&[ForecastDay]>, strict: bool) -> bool {
    validate_logged(region_id, forecast, strict).is_ok()
}

/// Whether any entry falls on `day`.
pub fn covers_day(forecast: &[ForecastDay], day: NaiveDate) -> bool {
    forecast.iter().any(|d| d.date == day)
}

/// Whether the forecast includes today's date in the process-local time
/// zone. A valid forecast that fails this is stale: the provider has not
/// published for today yet.
pub fn covers_current_day(region_id: &str, forecast: &[ForecastDay]) -> bool {
    let covered = covers_day(forecast, Local::now().date_naive());
    if !covered {
        debug!(region = region_id, "Forecast does not cover the current day");
    }
    covered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(date: &str, level: u8) -> ForecastDay {
        ForecastDay::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(), level)
    }

    #[test]
    fn test_missing_forecast_only_valid_for_exception_regions() {
        assert!(!is_structurally_valid("nwac_olympics", None, false));
        assert!(!is_structurally_valid("nwac_olympics", Some(&[]), false));
        assert!(is_structurally_valid("cacb_northrockies", None, false));
        assert!(is_structurally_valid("cacb_northrockies", Some(&[]), true));
    }

    #[test]
    fn test_consecutive_forecasts_are_valid() {
        let forecast = [day("2012-12-31", 2), day("2013-01-01", 3), day("2013-01-02", 3)];
        assert!(is_structurally_valid("nwac_olympics", Some(&forecast), false));

        let unrated = [day("2013-12-05", 0), day("2013-12-06", 0)];
        assert!(is_structurally_valid("nwac_mt-hood", Some(&unrated), true));
    }

    #[test]
    fn test_bad_dates_are_invalid() {
        let cases: [&[ForecastDay]; 5] = [
            &[day("2012-01-01", 1), day("2012-01-03", 1)],
            &[day("2012-01-01", 1), day("2012-01-01", 1)],
            &[day("2012-01-01", 1), day("2011-12-31", 1)],
            &[day("2012-01-01", 1), day("2012-01-02", 1), day("2012-01-04", 1)],
            &[day("2012-01-01", 1), day("2012-01-02", 1), day("2012-01-01", 1)],
        ];
        for forecast in cases {
            assert!(!is_structurally_valid("nwac_olympics", Some(forecast), false));
        }
        assert_eq!(
            validate("nwac_olympics", Some(cases[3])),
            Err(ValidationError::NotConsecutive { index: 2 })
        );
    }

    #[test]
    fn test_mixed_levels_are_invalid() {
        let cases: [&[ForecastDay]; 3] = [
            &[day("2012-01-01", 1), day("2012-01-02", 0)],
            &[day("2012-01-01", 0), day("2012-01-02", 1)],
            &[day("2012-01-01", 4), day("2012-01-02", 1), day("2012-01-03", 0)],
        ];
        for forecast in cases {
            assert_eq!(
                validate("nwac_olympics", Some(forecast)),
                Err(ValidationError::MixedRating)
            );
        }
    }

    #[test]
    fn test_exception_region_still_checked_when_present() {
        let forecast = [day("2012-01-01", 1), day("2012-01-03", 1)];
        assert!(!is_structurally_valid("cacb_northrockies", Some(&forecast), false));
    }

    #[test]
    fn test_covers_day() {
        let forecast = [day("2012-01-01", 2), day("2012-01-02", 3)];
        assert!(!covers_day(&forecast, NaiveDate::from_ymd_opt(2012, 1, 3).unwrap()));
        assert!(covers_day(&forecast, NaiveDate::from_ymd_opt(2012, 1, 2).unwrap()));
    }

    #[test]
    fn test_covers_current_day() {
        let old = [day("2012-01-01", 2), day("2012-01-02", 3)];
        assert!(!covers_current_day("nwac_olympics", &old));

        let today = Local::now().date_naive();
        let current = [
            ForecastDay::new(today, 2),
            ForecastDay::new(today + Duration::days(1), 3),
        ];
        assert!(covers_current_day("nwac_olympics", &current));
    }
}
