//! RSS advisory feeds and the FAC zone document.
//!
//! The RSS providers differ only in where the issue date sits in the first
//! `item`; the rating always comes from the prose description.

use chrono::NaiveDate;

use crate::forecast::danger::{highest_level_in_text, level_from_name};
use crate::forecast::models::{consecutive_days, AviLevel, ForecastDay, NO_RATING};
use crate::forecast::Forecast;
use crate::parsers::dates::{caaml_date, date_from_numeric, date_from_prose, date_from_rfc2822};
use crate::parsers::html::fragment_text;
use crate::parsers::xml::Element;
use crate::parsers::ParseError;
use crate::region::Region;

/// ESAC advisories cover the issue day and the next.
const ESAC_DAYS: usize = 2;

fn first_item(raw: &str) -> Result<Element, ParseError> {
    Element::parse(raw)?
        .find("item")
        .cloned()
        .ok_or(ParseError::NoDays)
}

fn item_field<'a>(item: &'a Element, name: &'static str) -> Result<&'a str, ParseError> {
    item.child(name)
        .map(Element::text)
        .ok_or(ParseError::Missing(name))
}

/// Worst level named in the description, which is usually escaped HTML.
fn item_level(item: &Element) -> Result<AviLevel, ParseError> {
    let description = item_field(item, "description")?;
    Ok(highest_level_in_text(&fragment_text(description)))
}

fn one_day(
    raw: &str,
    date: impl FnOnce(&Element) -> Result<NaiveDate, ParseError>,
) -> Result<Forecast, ParseError> {
    let item = first_item(raw)?;
    Ok(vec![ForecastDay::new(date(&item)?, item_level(&item)?)])
}

fn title_date(
    item: &Element,
    extract: fn(&str) -> Option<NaiveDate>,
) -> Result<NaiveDate, ParseError> {
    let title = item_field(item, "title")?;
    extract(title).ok_or_else(|| ParseError::Date(title.to_string()))
}

/// Sierra: Dublin Core `dc:date` timestamp, already in local time.
pub fn parse_sac(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    one_day(raw, |item| caaml_date(item_field(item, "date")?))
}

/// Mount Shasta: RFC 2822 `pubDate`, converted to the provider's zone.
pub fn parse_msac(raw: &str, region: &Region) -> Result<Forecast, ParseError> {
    let tz = region.provider().time_zone();
    one_day(raw, |item| {
        let stamp = item_field(item, "pubDate")?;
        date_from_rfc2822(stamp, tz).ok_or_else(|| ParseError::Date(stamp.to_string()))
    })
}

/// Mount Washington: prose date in the item title.
pub fn parse_mwac(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    one_day(raw, |item| title_date(item, date_from_prose))
}

/// West Central Montana: `M/D/YYYY` in the item title.
pub fn parse_wcmac(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    one_day(raw, |item| title_date(item, date_from_numeric))
}

/// Eastern Sierra: prose date in the title, rating applies to two days.
pub fn parse_esac(raw: &str, _region: &Region) -> Result<Forecast, ParseError> {
    let item = first_item(raw)?;
    let start = title_date(&item, date_from_prose)?;
    Ok(consecutive_days(start, ESAC_DAYS, item_level(&item)?))
}

/// Flathead: one advisory document listing every zone by numeric id.
pub fn parse_fac(raw: &str, region: &Region) -> Result<Forecast, ParseError> {
    let doc = Element::parse(raw)?;
    let advisory = if doc.name() == "advisory" {
        &doc
    } else {
        doc.find("advisory").ok_or(ParseError::Missing("advisory"))?
    };
    let issued = advisory
        .attr("issued")
        .ok_or(ParseError::Missing("issued"))?;
    let date = caaml_date(issued)?;

    let zone_id = region.local_id();
    let zone = advisory
        .find_all("zone")
        .into_iter()
        .find(|z| z.attr("id") == Some(zone_id))
        .ok_or_else(|| ParseError::ZoneNotInFeed(zone_id.to_string()))?;
    let level = zone
        .child("rating")
        .map_or(NO_RATING, |r| level_from_name(r.text()));
    Ok(vec![ForecastDay::new(date, level)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(id: &str) -> Region {
        Region::new(id, "Test", "http://example.invalid/feed").unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rss(item: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/"><channel><title>Advisories</title>{item}</channel></rss>"#
        )
    }

    #[test]
    fn test_only_first_item_counts() {
        let raw = rss(
            "<item><title>Sunday, February 16, 2014</title><description>&lt;p&gt;Considerable&lt;/p&gt;</description></item>\
             <item><title>Saturday, February 15, 2014</title><description>High</description></item>",
        );
        let forecast = parse_mwac(&raw, &region("mwac_1")).unwrap();
        assert_eq!(forecast, vec![ForecastDay::new(ymd(2014, 2, 16), 3)]);
    }

    #[test]
    fn test_channel_without_items_fails() {
        assert!(matches!(parse_sac(&rss(""), &region("sac_1")), Err(ParseError::NoDays)));
    }

    #[test]
    fn test_missing_description_fails() {
        let raw = rss("<item><title>1/9/2013</title></item>");
        assert!(matches!(
            parse_wcmac(&raw, &region("wcmac_bitterroot")),
            Err(ParseError::Missing("description"))
        ));
    }

    #[test]
    fn test_esac_covers_two_days() {
        let raw = rss("<item><title>Friday, January 31, 2014</title><description>Considerable above treeline</description></item>");
        let forecast = parse_esac(&raw, &region("esac_mammoth")).unwrap();
        assert_eq!(
            forecast,
            vec![ForecastDay::new(ymd(2014, 1, 31), 3), ForecastDay::new(ymd(2014, 2, 1), 3)]
        );
    }

    #[test]
    fn test_fac_zone_lookup() {
        let raw = r#"<advisory issued="2014-12-11T07:00:00-07:00">
            <zone id="1"><rating>Low</rating></zone>
            <zone id="2"><rating>Moderate</rating></zone>
        </advisory>"#;
        assert_eq!(
            parse_fac(raw, &region("fac_2")).unwrap(),
            vec![ForecastDay::new(ymd(2014, 12, 11), 2)]
        );
        assert!(matches!(parse_fac(raw, &region("fac_7")), Err(ParseError::ZoneNotInFeed(_))));
    }
}
