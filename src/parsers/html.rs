//! HTML advisory pages.
//!
//! These providers publish prose, so the rating comes from the danger-level
//! classifier run over the advisory text and the date from whatever
//! human- or machine-readable issue stamp the page carries.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::forecast::danger::{highest_level_in_text, level_from_name};
use crate::forecast::models::{AviLevel, ForecastDay};
use crate::forecast::Forecast;
use crate::parsers::dates::{date_from_epoch_millis, date_from_prose};
use crate::parsers::ParseError;
use crate::region::{Provider, Region};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector")
}

static VIAC_DATE: Lazy<Selector> = Lazy::new(|| selector("div.date"));
static VIAC_DAY: Lazy<Selector> = Lazy::new(|| selector("div.day-forecast"));
static WB_ISSUED: Lazy<Selector> = Lazy::new(|| selector("p.issued"));
static WB_ROWS: Lazy<Selector> = Lazy::new(|| selector("table.ratings tr"));
static TD: Lazy<Selector> = Lazy::new(|| selector("td"));
static HG_ISSUED: Lazy<Selector> = Lazy::new(|| selector(".issued"));
static HG_RATING: Lazy<Selector> = Lazy::new(|| selector("span.rating"));
static IPAC_DATE: Lazy<Selector> = Lazy::new(|| selector("h2.advisory-title"));
static IPAC_HAZARD: Lazy<Selector> = Lazy::new(|| selector("div.hazard"));
static JAC_DATE: Lazy<Selector> = Lazy::new(|| selector("span.date-display-single"));
static JAC_SUMMARY: Lazy<Selector> = Lazy::new(|| selector("div.advisory-summary"));
static PAC_DATE: Lazy<Selector> = Lazy::new(|| selector("div.forecast-date"));
static PAC_BOTTOM_LINE: Lazy<Selector> = Lazy::new(|| selector("div.bottom-line"));

/// All text under `el`, text nodes separated by spaces.
fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

fn first_text(doc: &Html, sel: &Selector) -> Option<String> {
    doc.select(sel).next().map(element_text)
}

/// Plain text of an HTML fragment, with markup removed and entities decoded.
pub(crate) fn fragment_text(html: &str) -> String {
    element_text(Html::parse_fragment(html).root_element())
}

fn prose_date(text: &str) -> Result<NaiveDate, ParseError> {
    date_from_prose(text).ok_or_else(|| ParseError::Date(text.trim().to_string()))
}

/// One day: a prose date under `date_sel`, rated by the prose under
/// `text_sel`.
fn single_day(raw: &str, date_sel: &Selector, text_sel: &Selector) -> Result<Forecast, ParseError> {
    let doc = Html::parse_document(raw);
    let date_text = first_text(&doc, date_sel).ok_or(ParseError::Missing("issued date"))?;
    let date = prose_date(&date_text)?;
    let text = first_text(&doc, text_sel).ok_or(ParseError::Missing("advisory text"))?;
    Ok(vec![ForecastDay::new(date, highest_level_in_text(&text))])
}

fn viac_issued(doc: &Html) -> Option<NaiveDate> {
    let tz = Provider::Viac.time_zone();
    if let Some(stamp) = doc.select(&VIAC_DATE).next() {
        let from_title = stamp
            .value()
            .attr("title")
            .and_then(|millis| date_from_epoch_millis(millis, tz));
        if let Some(date) = from_title.or_else(|| date_from_prose(&element_text(stamp))) {
            return Some(date);
        }
    }
    date_from_prose(&element_text(doc.root_element()))
}

/// Issue date of a VIAC page fragment: the epoch-millisecond `title` of
/// `div.date` when present, otherwise the first readable date in the text.
pub fn issued_date_viac(html: &str) -> Option<NaiveDate> {
    viac_issued(&Html::parse_fragment(html))
}

/// Vancouver Island: consecutive days from the issue date, one per
/// `div.day-forecast` block.
pub fn parse_viac(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    let doc = Html::parse_document(raw);
    let issued = viac_issued(&doc).ok_or(ParseError::Missing("issued date"))?;
    let days: Forecast = doc
        .select(&VIAC_DAY)
        .zip(issued.iter_days())
        .map(|(block, date)| ForecastDay::new(date, highest_level_in_text(&element_text(block))))
        .collect();
    if days.is_empty() {
        return Err(ParseError::NoDays);
    }
    Ok(days)
}

/// Whistler Blackcomb: a ratings table with one row per elevation band and
/// one column per day after the label column.
pub fn parse_wb(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    let doc = Html::parse_document(raw);
    let date_text = first_text(&doc, &WB_ISSUED).ok_or(ParseError::Missing("issued date"))?;
    let issued = prose_date(&date_text)?;

    let mut columns: Vec<AviLevel> = Vec::new();
    for row in doc.select(&WB_ROWS) {
        let cells: Vec<String> = row.select(&TD).map(element_text).collect();
        for (i, cell) in cells.iter().skip(1).enumerate() {
            let level = level_from_name(cell);
            match columns.get_mut(i) {
                Some(col) => *col = (*col).max(level),
                None => columns.push(level),
            }
        }
    }
    if columns.is_empty() {
        return Err(ParseError::NoDays);
    }
    Ok(columns
        .into_iter()
        .zip(issued.iter_days())
        .map(|(level, date)| ForecastDay::new(date, level))
        .collect())
}

/// Hatcher Pass: one `span.rating` per day from the issue date.
pub fn parse_hg(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    let doc = Html::parse_document(raw);
    let date_text = first_text(&doc, &HG_ISSUED).ok_or(ParseError::Missing("issued date"))?;
    let issued = prose_date(&date_text)?;
    let days: Forecast = doc
        .select(&HG_RATING)
        .zip(issued.iter_days())
        .map(|(rating, date)| ForecastDay::new(date, highest_level_in_text(&element_text(rating))))
        .collect();
    if days.is_empty() {
        return Err(ParseError::NoDays);
    }
    Ok(days)
}

pub fn parse_ipac(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    single_day(raw, &IPAC_DATE, &IPAC_HAZARD)
}

pub fn parse_jac(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    single_day(raw, &JAC_DATE, &JAC_SUMMARY)
}

pub fn parse_pac(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    single_day(raw, &PAC_DATE, &PAC_BOTTOM_LINE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn region(id: &str) -> Region {
        Region::new(id, "Test", "http://example.invalid/feed").unwrap()
    }

    #[test]
    fn test_issued_date_viac_from_prose() {
        assert_eq!(
            issued_date_viac("<div>Issued February 24, 2012 at 11:19AM</div>"),
            Some(ymd(2012, 2, 24))
        );
        assert_eq!(
            issued_date_viac("<div>Issued February 24th, 2012 at 11:19AM</div>"),
            Some(ymd(2012, 2, 24))
        );
    }

    #[test]
    fn test_issued_date_viac_prefers_epoch_title() {
        let fragment = r#"<div class="date" title="1330111140000">March 1st, 2012</div>"#;
        assert_eq!(issued_date_viac(fragment), Some(ymd(2012, 2, 24)));

        let bogus_title = r#"<div class="date" title="soon">February 24th, 2012</div>"#;
        assert_eq!(issued_date_viac(bogus_title), Some(ymd(2012, 2, 24)));

        assert_eq!(issued_date_viac("<p>nothing here</p>"), None);
    }

    #[test]
    fn test_fragment_text_strips_markup() {
        assert_eq!(
            highest_level_in_text(&fragment_text("<p>Danger is <b>HIGH</b> &amp; rising</p>")),
            4
        );
    }

    #[test]
    fn test_wb_takes_worst_band_per_column() {
        let raw = r#"<html><body><p class="issued">Sunday, February 3, 2013</p>
            <table class="ratings">
              <tr><th>Elevation</th><th>Sun</th><th>Mon</th></tr>
              <tr><td>Alpine</td><td>Moderate</td><td>High</td></tr>
              <tr><td>Treeline</td><td>Low</td><td>Considerable</td></tr>
            </table></body></html>"#;
        let forecast = parse_wb(raw, &region("wb_")).unwrap();
        assert_eq!(
            forecast,
            vec![ForecastDay::new(ymd(2013, 2, 3), 2), ForecastDay::new(ymd(2013, 2, 4), 4)]
        );
    }

    #[test]
    fn test_single_day_requires_both_parts() {
        let no_text = r#"<h2 class="advisory-title">Friday, February 8, 2013</h2>"#;
        assert!(matches!(
            parse_ipac(no_text, &region("ipac_1")),
            Err(ParseError::Missing("advisory text"))
        ));
        let bad_date = r#"<h2 class="advisory-title">Friday</h2><div class="hazard">Low</div>"#;
        assert!(matches!(parse_ipac(bad_date, &region("ipac_1")), Err(ParseError::Date(_))));
    }
}
