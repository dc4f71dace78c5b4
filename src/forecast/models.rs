use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Avalanche danger rating: 0 = no official rating, 1..=5 = low..extreme.
pub type AviLevel = u8;

pub const NO_RATING: AviLevel = 0;
pub const MAX_LEVEL: AviLevel = 5;

/// One calendar day of a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    #[serde(rename = "aviLevel")]
    pub avi_level: AviLevel,
}

impl ForecastDay {
    pub fn new(date: NaiveDate, avi_level: AviLevel) -> Self {
        Self { date, avi_level }
    }
}

/// Ordered run of forecast days, oldest first.
pub type Forecast = Vec<ForecastDay>;

/// Build a forecast of `days` consecutive days starting at `start`, all
/// sharing one level.
pub fn consecutive_days(start: NaiveDate, days: usize, avi_level: AviLevel) -> Forecast {
    start
        .iter_days()
        .take(days)
        .map(|date| ForecastDay::new(date, avi_level))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_avi_level_key() {
        let day = ForecastDay::new(NaiveDate::from_ymd_opt(2012, 12, 4).unwrap(), 3);
        assert_eq!(
            serde_json::to_string(&day).unwrap(),
            r#"{"date":"2012-12-04","aviLevel":3}"#
        );
    }

    #[test]
    fn test_consecutive_days() {
        let start = NaiveDate::from_ymd_opt(2013, 12, 31).unwrap();
        let forecast = consecutive_days(start, 2, 3);
        assert_eq!(forecast.len(), 2);
        assert_eq!(forecast[1].date, NaiveDate::from_ymd_opt(2014, 1, 1).unwrap());
        assert!(forecast.iter().all(|d| d.avi_level == 3));
    }
}
