//! Hero extraction from console log text.
//!
//! Update these patterns when the game's console output changes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::heroes::HeroTable;

static RE_SELECTHERO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)selecthero\s+(hero_\w+)").unwrap());
static RE_PLAYING_AS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Playing as:\s+(hero_\w+)").unwrap());
static RE_SELECTED_HERO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Selected hero:\s+(hero_\w+)").unwrap());

/// Patterns in priority order.
fn patterns() -> [&'static Regex; 3] {
    [&*RE_SELECTHERO, &*RE_PLAYING_AS, &*RE_SELECTED_HERO]
}

/// Returns the lowercased id of the most recently selected hero in `text`.
///
/// The first pattern with any match is authoritative, even when a lower
/// priority pattern matches later in the text. Within that pattern the
/// rightmost match wins.
pub fn extract_hero_id(text: &str) -> Option<String> {
    patterns().into_iter().find_map(|re| {
        re.captures_iter(text)
            .last()
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_lowercase())
    })
}

/// Returns the display name of the most recently selected hero in `text`.
///
/// Ids missing from `table` yield `None`.
pub fn extract_character(text: &str, table: &HeroTable) -> Option<String> {
    resolve(&extract_hero_id(text)?, table)
}

pub(crate) fn resolve(id: &str, table: &HeroTable) -> Option<String> {
    match table.display_name(id) {
        Some(name) => Some(name.to_string()),
        None => {
            tracing::debug!(hero_id = %id, "unknown hero id in console log");
            None
        }
    }
}
