//! Trait definition and response schema for catalog providers.
//!
//! This module defines the [`CatalogProvider`] trait that a remote catalog
//! backend implements, the typed detail response every field of a
//! [`MetadataRecord`](reeltag_core::MetadataRecord) is derived from, and the
//! tagged [`CatalogError`] returned by every provider call.

use async_trait::async_trait;
use reeltag_core::MediaKind;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a catalog call produced nothing.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog has no entry for the request.
    #[error("not found: {0}")]
    NotFound(String),

    /// DNS, connection, timeout or non-2xx status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected schema.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl CatalogError {
    /// Only transport failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Transport(_))
    }
}

// ---------------------------------------------------------------------------
// Response schema
// ---------------------------------------------------------------------------

/// A single search result. Only the identifier is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: u64,
}

/// Detail response for a movie or series.
///
/// Movies and series use different field names for the same concepts
/// (`title`/`name`, `release_date`/`first_air_date`); both are carried and
/// the accessors pick by kind. Every field is optional so a sparse response
/// still deserializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDetails {
    pub id: u64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub genres: Option<Vec<Genre>>,
    pub vote_average: Option<f64>,
    pub runtime: Option<u32>,
    pub episode_run_time: Option<Vec<u32>>,
    pub credits: Option<Credits>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genre {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credits {
    pub cast: Option<Vec<CastCredit>>,
    pub crew: Option<Vec<CrewCredit>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastCredit {
    pub name: Option<String>,
    pub character: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrewCredit {
    pub name: Option<String>,
    pub job: Option<String>,
}

impl CatalogDetails {
    /// Display title for the kind (`title` for movies, `name` for series).
    pub fn display_title(&self, kind: MediaKind) -> Option<&str> {
        match kind {
            MediaKind::Movie => self.title.as_deref(),
            MediaKind::Series => self.name.as_deref(),
        }
    }

    pub fn original_title_for(&self, kind: MediaKind) -> Option<&str> {
        match kind {
            MediaKind::Movie => self.original_title.as_deref(),
            MediaKind::Series => self.original_name.as_deref(),
        }
    }

    /// Release date for movies, first air date for series.
    pub fn date(&self, kind: MediaKind) -> Option<&str> {
        match kind {
            MediaKind::Movie => self.release_date.as_deref(),
            MediaKind::Series => self.first_air_date.as_deref(),
        }
    }

    /// Movie runtime, or the first episode runtime of a series. 0 if unknown.
    pub fn runtime_minutes(&self, kind: MediaKind) -> u32 {
        match kind {
            MediaKind::Movie => self.runtime.unwrap_or(0),
            MediaKind::Series => self
                .episode_run_time
                .as_ref()
                .and_then(|r| r.first().copied())
                .unwrap_or(0),
        }
    }

    pub fn genre_names(&self) -> Vec<String> {
        self.genres
            .iter()
            .flatten()
            .filter_map(|g| g.name.clone())
            .collect()
    }

    pub fn cast(&self) -> &[CastCredit] {
        self.credits
            .as_ref()
            .and_then(|c| c.cast.as_deref())
            .unwrap_or(&[])
    }

    pub fn crew(&self) -> &[CrewCredit] {
        self.credits
            .as_ref()
            .and_then(|c| c.crew.as_deref())
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// A remote catalog of movies and series.
///
/// Implementors must be `Send + Sync` so they can be shared behind an `Arc`
/// by concurrent resolutions.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Short identifier used in logs (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Search by title. `year` is only sent for movies.
    async fn search(
        &self,
        kind: MediaKind,
        title: &str,
        year: Option<u16>,
    ) -> Result<Vec<SearchHit>, CatalogError>;

    /// Fetch the full detail record, including credits.
    async fn details(&self, kind: MediaKind, id: u64) -> Result<CatalogDetails, CatalogError>;

    /// Download an image given the path fragment from [`CatalogDetails::poster_path`].
    async fn fetch_image(&self, path: &str) -> Result<Vec<u8>, CatalogError>;
}
