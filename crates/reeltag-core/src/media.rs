//! Media-domain types: media kind, the cached metadata record, and the
//! supported container check.
//!
//! [`MetadataRecord`] is the unit of cached knowledge about one file. Field
//! names are the on-disk names of the cache index. Legacy names written by
//! older tooling (`id`, `poster_path`, `type`, `runtime`) are accepted on
//! read.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Container extensions that support embedded metadata and cover art.
const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "mkv", "m4v"];

/// Check if a path has a supported container extension (case-insensitive).
///
/// ```
/// use std::path::Path;
/// use reeltag_core::is_supported_container;
///
/// assert!(is_supported_container(Path::new("Dune (2021).mkv")));
/// assert!(is_supported_container(Path::new("/media/clip.M4V")));
/// assert!(!is_supported_container(Path::new("movie.avi")));
/// ```
pub fn is_supported_container(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// MediaKind
// ---------------------------------------------------------------------------

/// Movie or series classification. Drives which catalog endpoints and
/// field names apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Movie,
    #[serde(alias = "tv")]
    Series,
}

impl MediaKind {
    /// Path segment the catalog uses for this kind (`movie` or `tv`).
    pub fn catalog_segment(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "tv",
        }
    }

    /// Crew job title that marks a director-like credit for this kind.
    pub fn director_job(&self) -> &'static str {
        match self {
            Self::Movie => "Director",
            Self::Series => "Creator",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Series => write!(f, "series"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(Self::Movie),
            "series" | "tv" => Ok(Self::Series),
            _ => Err(format!("Unknown media kind: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// MetadataRecord
// ---------------------------------------------------------------------------

/// A credited cast member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    pub character: String,
}

/// Resolved catalog metadata for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Stable catalog identifier.
    #[serde(alias = "id")]
    pub catalog_id: u64,
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    /// Four-digit year, or empty when unknown.
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub overview: String,
    /// Downloaded poster inside the cache's poster storage, if any.
    #[serde(default, alias = "poster_path")]
    pub local_poster_path: Option<PathBuf>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default, alias = "type")]
    pub kind: MediaKind,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default, alias = "runtime")]
    pub runtime_minutes: u32,
}

impl MetadataRecord {
    /// The poster path, but only if the file is still on disk.
    pub fn existing_poster(&self) -> Option<&Path> {
        self.local_poster_path
            .as_deref()
            .filter(|p| p.is_file())
    }
}
