//! reeltag-parser: turns a bare filename stem into a catalog query.
//!
//! Four patterns are tried in order and the first match wins:
//!
//! 1. `Title (YYYY)...` - movie with a parenthesised year.
//! 2. `Title.YYYY....` - movie with a period-delimited year.
//! 3. `Title S01E02...` - series episode (case-insensitive marker).
//! 4. Anything else - movie, no year, title is the text before the first period.
//!
//! # Quick start
//!
//! ```
//! use reeltag_core::MediaKind;
//! use reeltag_parser::parse;
//!
//! let q = parse("Dune (2021) 2160p");
//! assert_eq!(q.title, "Dune");
//! assert_eq!(q.year, Some(2021));
//! assert_eq!(q.kind, MediaKind::Movie);
//! ```

pub mod types;
mod parser;

pub use types::{EpisodeMarker, ParsedQuery};

/// Parse a filename stem (no extension) into a [`ParsedQuery`].
///
/// Never fails; unrecognised names fall back to a year-less movie query.
///
/// # Examples
///
/// ```
/// use reeltag_core::MediaKind;
///
/// let q = reeltag_parser::parse("Breaking.Bad.S01E01.720p");
/// assert_eq!(q.title, "Breaking Bad");
/// assert_eq!(q.year, None);
/// assert_eq!(q.kind, MediaKind::Series);
/// ```
pub fn parse(stem: &str) -> ParsedQuery {
    parser::parse(stem)
}

/// Season and episode numbers of an `S<digits>E<digits>` marker, if present.
///
/// These are not part of the catalog lookup key; [`parse`] drops them.
pub fn episode_marker(stem: &str) -> Option<EpisodeMarker> {
    parser::episode_marker(stem)
}
