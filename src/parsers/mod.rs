//! Provider feed parsers.
//!
//! Every provider maps to one pure function from raw feed text to a
//! normalized forecast. Parsers never panic on bad input and never return a
//! partially built forecast: any mismatch is a [`ParseError`].

pub mod caaml;
pub mod dates;
pub mod feed;
pub mod html;
pub mod json;
pub mod xml;

use thiserror::Error;

use crate::forecast::Forecast;
use crate::region::{Provider, Region};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(String),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("unparseable date: {0:?}")]
    Date(String),
    #[error("unrecognized danger rating: {0:?}")]
    Level(String),
    #[error("zone {0:?} not present in feed")]
    ZoneNotInFeed(String),
    #[error("feed contains no forecast days")]
    NoDays,
}

pub type ParseFn = fn(&str, &Region) -> Result<Forecast, ParseError>;

/// Flat provider → parser table.
pub fn parser_for(provider: Provider) -> ParseFn {
    match provider {
        Provider::Nwac => json::parse_nwac,
        Provider::Uac => json::parse_uac,
        Provider::Cac | Provider::Cacb => caaml::parse_cac,
        Provider::Pc => caaml::parse_pc,
        Provider::Caic | Provider::Btac | Provider::Gnfac | Provider::Snfac => {
            caaml::parse_simple_caaml
        }
        Provider::Cnfaic => caaml::parse_cnfaic,
        Provider::Fac => feed::parse_fac,
        Provider::Sac => feed::parse_sac,
        Provider::Msac => feed::parse_msac,
        Provider::Mwac => feed::parse_mwac,
        Provider::Wcmac => feed::parse_wcmac,
        Provider::Esac => feed::parse_esac,
        Provider::Viac => html::parse_viac,
        Provider::Wb => html::parse_wb,
        Provider::Hg => html::parse_hg,
        Provider::Ipac => html::parse_ipac,
        Provider::Jac => html::parse_jac,
        Provider::Pac => html::parse_pac,
    }
}

/// Parse a raw feed with the parser belonging to the region's provider.
pub fn parse(raw: &str, region: &Region) -> Result<Forecast, ParseError> {
    parser_for(region.provider())(raw, region)
}
