//! JSON feeds.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::forecast::danger::level_from_name;
use crate::forecast::models::{AviLevel, ForecastDay, NO_RATING};
use crate::forecast::Forecast;
use crate::parsers::dates::date_from_prose;
use crate::parsers::ParseError;
use crate::region::Region;

#[derive(Debug, Deserialize)]
struct NwacFeed {
    days: Vec<NwacDay>,
}

#[derive(Debug, Deserialize)]
struct NwacDay {
    date: NaiveDate,
    #[serde(default)]
    danger: NwacDanger,
}

/// Band ratings by elevation. Unrated bands are `null` or absent.
#[derive(Debug, Default, Deserialize)]
struct NwacDanger {
    above_treeline: Option<String>,
    near_treeline: Option<String>,
    below_treeline: Option<String>,
}

impl NwacDanger {
    fn level(&self) -> AviLevel {
        [&self.above_treeline, &self.near_treeline, &self.below_treeline]
            .into_iter()
            .map(|band| band.as_deref().map_or(NO_RATING, level_from_name))
            .max()
            .unwrap_or(NO_RATING)
    }
}

/// NWAC day-indexed feed: one entry per published day, rated by the worst
/// elevation band.
pub fn parse_nwac(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    let feed: NwacFeed = serde_json::from_str(raw)?;
    if feed.days.is_empty() {
        return Err(ParseError::NoDays);
    }
    Ok(feed
        .days
        .iter()
        .map(|day| ForecastDay::new(day.date, day.danger.level()))
        .collect())
}

#[derive(Debug, Deserialize)]
struct UacFeed {
    #[serde(default)]
    advisories: Vec<UacEntry>,
}

#[derive(Debug, Deserialize)]
struct UacEntry {
    advisory: UacAdvisory,
}

#[derive(Debug, Deserialize)]
struct UacAdvisory {
    date_issued: String,
    overall_danger_rating: Option<String>,
}

/// Utah: the first advisory's issue date and overall rating, one day.
pub fn parse_uac(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    let feed: UacFeed = serde_json::from_str(raw)?;
    let advisory = &feed.advisories.first().ok_or(ParseError::NoDays)?.advisory;
    let date = date_from_prose(&advisory.date_issued)
        .ok_or_else(|| ParseError::Date(advisory.date_issued.clone()))?;
    let level = advisory
        .overall_danger_rating
        .as_deref()
        .map_or(NO_RATING, level_from_name);
    Ok(vec![ForecastDay::new(date, level)])
}
