//! CAAML dialects.
//!
//! All of them share the `validTime` + danger-rating element shape but
//! disagree on where the rating lives and how many elements make up a day.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::forecast::models::{AviLevel, ForecastDay, MAX_LEVEL, NO_RATING};
use crate::forecast::Forecast;
use crate::parsers::dates::caaml_date;
use crate::parsers::xml::Element;
use crate::parsers::ParseError;
use crate::region::Region;

const PC_VALUE_TAGS: [&str; 3] = [
    "dangerRatingAlpValue",
    "dangerRatingTlnValue",
    "dangerRatingBtlValue",
];

/// Numeric CAAML rating. "N/A" and blank values are unrated.
fn caaml_level(value: &str) -> Result<AviLevel, ParseError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("n/a") || value.eq_ignore_ascii_case("norating")
    {
        return Ok(NO_RATING);
    }
    match value.parse::<AviLevel>() {
        Ok(level) if level <= MAX_LEVEL => Ok(level),
        _ => Err(ParseError::Level(value.to_string())),
    }
}

/// Start of an element's validity period.
fn valid_date(el: &Element) -> Result<NaiveDate, ParseError> {
    let valid_time = el.find("validTime").ok_or(ParseError::Missing("validTime"))?;
    let position = valid_time
        .find_text("beginPosition")
        .or_else(|| valid_time.find_text("timePosition"))
        .ok_or(ParseError::Missing("validTime position"))?;
    caaml_date(position)
}

fn max_main_value(el: &Element) -> Result<AviLevel, ParseError> {
    let values = el.find_all("mainValue");
    if values.is_empty() {
        return Err(ParseError::Missing("mainValue"));
    }
    values
        .iter()
        .map(|v| caaml_level(v.text()))
        .try_fold(NO_RATING, |acc, level| level.map(|l| acc.max(l)))
}

fn by_date(days: BTreeMap<NaiveDate, AviLevel>) -> Result<Forecast, ParseError> {
    if days.is_empty() {
        return Err(ParseError::NoDays);
    }
    Ok(days
        .into_iter()
        .map(|(date, level)| ForecastDay::new(date, level))
        .collect())
}

/// Avalanche Canada: one `DangerRating` per elevation band per day, each
/// with its own validity time. A day's level is the worst band.
pub fn parse_cac(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    let doc = Element::parse(raw)?;
    let mut days: BTreeMap<NaiveDate, AviLevel> = BTreeMap::new();
    for rating in doc.find_all("DangerRating") {
        let date = valid_date(rating)?;
        let level = max_main_value(rating)?;
        let entry = days.entry(date).or_insert(NO_RATING);
        *entry = (*entry).max(level);
    }
    by_date(days)
}

/// Parks Canada: one `DangerRating` per day carrying alpine, treeline and
/// below-treeline values. Report timestamps are not trusted. Days are kept
/// in document order, so a reordered or repeated day reaches validation.
pub fn parse_pc(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    let doc = Element::parse(raw)?;
    let mut days = Forecast::new();
    for rating in doc.find_all("DangerRating") {
        let date = valid_date(rating)?;
        let mut level = None;
        for tag in PC_VALUE_TAGS {
            if let Some(value) = rating.find_text(tag) {
                let band = caaml_level(value)?;
                level = Some(level.map_or(band, |l: AviLevel| l.max(band)));
            }
        }
        let level = level.ok_or(ParseError::Missing("dangerRating values"))?;
        days.push(ForecastDay::new(date, level));
    }
    if days.is_empty() {
        return Err(ParseError::NoDays);
    }
    Ok(days)
}

fn bulletin_days<'a>(bulletins: impl IntoIterator<Item = &'a Element>) -> Result<Forecast, ParseError> {
    let days = bulletins
        .into_iter()
        .map(|b| Ok(ForecastDay::new(valid_date(b)?, max_main_value(b)?)))
        .collect::<Result<Forecast, ParseError>>()?;
    if days.is_empty() {
        return Err(ParseError::NoDays);
    }
    Ok(days)
}

/// One day per `Bulletin`, rated by its worst `mainValue`.
pub fn parse_simple_caaml(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    let doc = Element::parse(raw)?;
    bulletin_days(doc.find_all("Bulletin"))
}

/// Multi-zone bulletin feed; only bulletins whose `locRef` points at the
/// region's zone count.
pub fn parse_cnfaic(raw: &str, region: &Region) -> Result<Forecast, ParseError> {
    let doc = Element::parse(raw)?;
    let zone = region.local_id();
    let bulletins: Vec<&Element> = doc
        .find_all("Bulletin")
        .into_iter()
        .filter(|b| {
            b.find_all("locRef")
                .iter()
                .filter_map(|r| r.attr("href"))
                .any(|href| href.trim_start_matches('#').eq_ignore_ascii_case(zone))
        })
        .collect();
    if bulletins.is_empty() {
        return Err(ParseError::ZoneNotInFeed(zone.to_string()));
    }
    bulletin_days(bulletins)
}
