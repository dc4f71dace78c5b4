//! Danger-level names to numeric ratings.
//!
//! Used by every parser whose source states the rating as a word, and by the
//! prose parsers that have to find the rating inside free-form advisory text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::forecast::models::{AviLevel, NO_RATING};

/// Canonical level names, index + 1 is the level.
pub const LEVEL_NAMES: [&str; 5] = ["low", "moderate", "considerable", "high", "extreme"];

static LEVEL_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(low|moderate|considerable|high|extreme)\b").expect("level word regex")
});

/// Exact, case-insensitive match against a level name, ignoring surrounding
/// whitespace. Anything else is `NO_RATING`.
pub fn level_from_name(name: &str) -> AviLevel {
    let name = name.trim();
    LEVEL_NAMES
        .iter()
        .position(|level| level.eq_ignore_ascii_case(name))
        .map_or(NO_RATING, |i| i as AviLevel + 1)
}

/// Highest level named as a whole word anywhere in `text`.
///
/// "high" inside "highways" does not count.
pub fn highest_level_in_text(text: &str) -> AviLevel {
    LEVEL_WORD_RE
        .find_iter(text)
        .map(|m| level_from_name(m.as_str()))
        .max()
        .unwrap_or(NO_RATING)
}
