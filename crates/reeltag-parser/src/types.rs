//! Output types for the filename parser.

use reeltag_core::MediaKind;
use serde::{Deserialize, Serialize};

/// Catalog lookup key derived from a filename stem. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// Title with periods normalised to spaces.
    pub title: String,
    /// Release year, only ever set for movies.
    pub year: Option<u16>,
    pub kind: MediaKind,
}

impl ParsedQuery {
    pub fn movie(title: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            title: title.into(),
            year,
            kind: MediaKind::Movie,
        }
    }

    pub fn series(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            kind: MediaKind::Series,
        }
    }
}

/// Season/episode pair from an `S01E02`-style marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeMarker {
    pub season: u32,
    pub episode: u32,
}
