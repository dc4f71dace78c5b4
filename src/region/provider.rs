//! Advisory providers and the shape of their region identifiers.
//!
//! A region id is `<providerPrefix>_<localId>`. The prefix selects the
//! provider (and therefore the parser and time zone); the local id must
//! match the shape that provider actually publishes.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Nwac,
    Cac,
    Cacb,
    Pc,
    Caic,
    Btac,
    Gnfac,
    Snfac,
    Uac,
    Viac,
    Sac,
    Esac,
    Wcmac,
    Wb,
    Ipac,
    Fac,
    Cnfaic,
    Jac,
    Hg,
    Mwac,
    Msac,
    Pac,
}

/// Accepted local-id shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocalIdShape {
    /// The provider publishes a single region; the local id is empty.
    Empty,
    /// One or two ASCII digits.
    Digits,
    /// One or two ASCII digits, optionally followed by one lowercase letter.
    DigitsWithSuffix,
    /// Lowercase letters, digits and hyphens.
    Slug,
    /// Letters and underscores, any case.
    Name,
}

const MAX_NAMED_ID_LEN: usize = 40;

impl Provider {
    pub const ALL: [Provider; 22] = [
        Provider::Nwac,
        Provider::Cac,
        Provider::Cacb,
        Provider::Pc,
        Provider::Caic,
        Provider::Btac,
        Provider::Gnfac,
        Provider::Snfac,
        Provider::Uac,
        Provider::Viac,
        Provider::Sac,
        Provider::Esac,
        Provider::Wcmac,
        Provider::Wb,
        Provider::Ipac,
        Provider::Fac,
        Provider::Cnfaic,
        Provider::Jac,
        Provider::Hg,
        Provider::Mwac,
        Provider::Msac,
        Provider::Pac,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Nwac => "nwac",
            Self::Cac => "cac",
            Self::Cacb => "cacb",
            Self::Pc => "pc",
            Self::Caic => "caic",
            Self::Btac => "btac",
            Self::Gnfac => "gnfac",
            Self::Snfac => "snfac",
            Self::Uac => "uac",
            Self::Viac => "viac",
            Self::Sac => "sac",
            Self::Esac => "esac",
            Self::Wcmac => "wcmac",
            Self::Wb => "wb",
            Self::Ipac => "ipac",
            Self::Fac => "fac",
            Self::Cnfaic => "cnfaic",
            Self::Jac => "jac",
            Self::Hg => "hg",
            Self::Mwac => "mwac",
            Self::Msac => "msac",
            Self::Pac => "pac",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.prefix() == prefix)
    }

    fn local_id_shape(self) -> LocalIdShape {
        match self {
            Self::Viac | Self::Wb | Self::Hg => LocalIdShape::Empty,
            Self::Pc
            | Self::Snfac
            | Self::Sac
            | Self::Ipac
            | Self::Fac
            | Self::Jac
            | Self::Mwac
            | Self::Msac
            | Self::Pac => LocalIdShape::Digits,
            Self::Caic => LocalIdShape::DigitsWithSuffix,
            Self::Gnfac => LocalIdShape::Name,
            Self::Nwac
            | Self::Cac
            | Self::Cacb
            | Self::Btac
            | Self::Uac
            | Self::Esac
            | Self::Wcmac
            | Self::Cnfaic => LocalIdShape::Slug,
        }
    }

    /// Whether `local_id` has the shape this provider's ids take.
    pub fn accepts_local_id(self, local_id: &str) -> bool {
        match self.local_id_shape() {
            LocalIdShape::Empty => local_id.is_empty(),
            LocalIdShape::Digits => {
                (1..=2).contains(&local_id.len()) && local_id.bytes().all(|b| b.is_ascii_digit())
            }
            LocalIdShape::DigitsWithSuffix => {
                let digits = local_id.bytes().take_while(u8::is_ascii_digit).count();
                let suffix = &local_id.as_bytes()[digits..];
                (1..=2).contains(&digits)
                    && (suffix.is_empty() || (suffix.len() == 1 && suffix[0].is_ascii_lowercase()))
            }
            LocalIdShape::Slug => {
                (1..=MAX_NAMED_ID_LEN).contains(&local_id.len())
                    && local_id
                        .bytes()
                        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
            }
            LocalIdShape::Name => {
                (1..=MAX_NAMED_ID_LEN).contains(&local_id.len())
                    && local_id.bytes().all(|b| b.is_ascii_alphabetic() || b == b'_')
            }
        }
    }

    /// Time zone of the forecast area, for turning instants into local dates.
    pub fn time_zone(self) -> Tz {
        match self {
            Self::Nwac | Self::Sac | Self::Esac | Self::Msac => chrono_tz::America::Los_Angeles,
            Self::Cac | Self::Cacb | Self::Viac | Self::Wb => chrono_tz::America::Vancouver,
            Self::Pc => chrono_tz::America::Edmonton,
            Self::Caic | Self::Btac | Self::Gnfac | Self::Uac | Self::Wcmac | Self::Fac => {
                chrono_tz::America::Denver
            }
            Self::Snfac | Self::Ipac | Self::Pac => chrono_tz::America::Boise,
            Self::Cnfaic | Self::Hg => chrono_tz::America::Anchorage,
            Self::Jac => chrono_tz::America::Juneau,
            Self::Mwac => chrono_tz::America::New_York,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Split a region id into its provider and local id.
///
/// Returns `None` for empty or malformed ids, unknown prefixes, and local
/// ids the provider never issues (e.g. an overlong numeric suffix).
pub fn parse_region_id(region_id: &str) -> Option<(Provider, &str)> {
    let (prefix, local_id) = region_id.split_once('_')?;
    let provider = Provider::from_prefix(prefix)?;
    provider
        .accepts_local_id(local_id)
        .then_some((provider, local_id))
}
