//! Pattern matching over filename stems.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{EpisodeMarker, ParsedQuery};

static PAREN_YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+)\(([0-9]{4})\)").expect("paren year regex should compile")
});
static DOT_YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+)\.([0-9]{4})\.").expect("dot year regex should compile")
});
static EPISODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+)[sS]([0-9]+)[eE]([0-9]+)").expect("episode regex should compile")
});

pub(crate) fn parse(stem: &str) -> ParsedQuery {
    for pattern in [&*PAREN_YEAR_PATTERN, &*DOT_YEAR_PATTERN] {
        if let Some(caps) = pattern.captures(stem) {
            let year = caps[2].parse::<u16>().ok();
            return ParsedQuery::movie(normalize_title(&caps[1]), year);
        }
    }

    if let Some(caps) = EPISODE_PATTERN.captures(stem) {
        return ParsedQuery::series(normalize_title(&caps[1]));
    }

    let head = stem.split('.').next().unwrap_or_default();
    ParsedQuery::movie(head.replace('.', " "), None)
}

pub(crate) fn episode_marker(stem: &str) -> Option<EpisodeMarker> {
    let caps = EPISODE_PATTERN.captures(stem)?;
    Some(EpisodeMarker {
        season: caps[2].parse().ok()?,
        episode: caps[3].parse().ok()?,
    })
}

/// Periods become spaces, surrounding whitespace is trimmed. Nothing else
/// is touched.
fn normalize_title(raw: &str) -> String {
    raw.replace('.', " ").trim().to_string()
}
