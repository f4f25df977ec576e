//! Turns a [`ParsedQuery`] into a [`MetadataRecord`].
//!
//! Two catalog round-trips (search, then detail with credits) plus a
//! best-effort poster download. The first search hit is accepted as-is.

use std::path::PathBuf;
use std::sync::Arc;

use reeltag_core::{CastMember, MediaKind, MetadataRecord};
use reeltag_parser::ParsedQuery;
use tracing::{debug, error, info, warn};

use crate::cache::PosterStore;
use crate::metadata::provider::{CatalogDetails, CatalogError, CatalogProvider};

/// Maximum number of cast members kept on a record.
const MAX_CAST: usize = 5;

/// Resolves parsed queries against a catalog provider.
#[derive(Clone)]
pub struct Resolver {
    provider: Arc<dyn CatalogProvider>,
    posters: PosterStore,
}

impl Resolver {
    pub fn new(provider: Arc<dyn CatalogProvider>, posters: PosterStore) -> Self {
        Self { provider, posters }
    }

    /// Resolve a query, logging and swallowing every failure.
    pub async fn resolve(&self, query: &ParsedQuery) -> Option<MetadataRecord> {
        match self.try_resolve(query).await {
            Ok(record) => {
                info!(title = %query.title, catalog_id = record.catalog_id, "metadata found");
                Some(record)
            }
            Err(CatalogError::NotFound(reason)) => {
                warn!(title = %query.title, "no catalog match: {reason}");
                None
            }
            Err(e) => {
                error!(
                    title = %query.title,
                    retryable = e.is_retryable(),
                    "metadata lookup failed: {e}"
                );
                None
            }
        }
    }

    /// Resolve a query, reporting why nothing was produced.
    ///
    /// A failed poster download never fails resolution; the record simply
    /// carries no poster.
    pub async fn try_resolve(&self, query: &ParsedQuery) -> Result<MetadataRecord, CatalogError> {
        if query.title.trim().is_empty() {
            return Err(CatalogError::NotFound("empty title".into()));
        }

        info!(
            title = %query.title,
            year = ?query.year,
            kind = %query.kind,
            provider = self.provider.name(),
            "searching catalog"
        );

        let hits = self
            .provider
            .search(query.kind, &query.title, query.year)
            .await?;
        let hit = hits
            .first()
            .ok_or_else(|| CatalogError::NotFound(format!("no results for {}", query.title)))?;

        let details = self.provider.details(query.kind, hit.id).await?;
        let catalog_id = if details.id != 0 { details.id } else { hit.id };

        let poster = match details.poster_path.as_deref() {
            Some(path) if !path.is_empty() => self.download_poster(catalog_id, path).await,
            _ => None,
        };

        Ok(build_record(query, catalog_id, &details, poster))
    }

    async fn download_poster(&self, catalog_id: u64, path: &str) -> Option<PathBuf> {
        let dest = self.posters.path_for(catalog_id);
        if dest.is_file() {
            debug!(catalog_id, "poster already downloaded");
            return Some(dest);
        }

        let bytes = match self.provider.fetch_image(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(catalog_id, "poster download failed: {e}");
                return None;
            }
        };

        match self.posters.store(catalog_id, &bytes) {
            Ok(stored) => Some(stored),
            Err(e) => {
                warn!(catalog_id, "failed to save poster: {e}");
                None
            }
        }
    }
}

/// Normalize a catalog detail response into a record.
pub fn build_record(
    query: &ParsedQuery,
    catalog_id: u64,
    details: &CatalogDetails,
    local_poster_path: Option<PathBuf>,
) -> MetadataRecord {
    let kind = query.kind;

    let title = details
        .display_title(kind)
        .map(str::to_string)
        .unwrap_or_else(|| query.title.clone());
    let original_title = details
        .original_title_for(kind)
        .map(str::to_string)
        .unwrap_or_else(|| query.title.clone());

    let year = match query.year {
        Some(year) => year.to_string(),
        None => details.date(kind).map(year_from_date).unwrap_or_default(),
    };

    MetadataRecord {
        catalog_id,
        title,
        original_title,
        year,
        overview: details.overview.clone().unwrap_or_default(),
        local_poster_path,
        genres: details.genre_names(),
        rating: details.vote_average.unwrap_or(0.0),
        kind,
        directors: directors(details, kind),
        cast: cast(details),
        runtime_minutes: details.runtime_minutes(kind),
    }
}

/// Text before the first `-`, accepted only if it is exactly 4 characters.
fn year_from_date(date: &str) -> String {
    let head = date.split('-').next().unwrap_or_default();
    if head.chars().count() == 4 {
        head.to_string()
    } else {
        String::new()
    }
}

fn directors(details: &CatalogDetails, kind: MediaKind) -> Vec<String> {
    let job = kind.director_job();
    details
        .crew()
        .iter()
        .filter(|c| c.job.as_deref() == Some(job))
        .filter_map(|c| c.name.clone())
        .collect()
}

/// The first [`MAX_CAST`] credits, keeping those with both a name and a
/// character.
fn cast(details: &CatalogDetails) -> Vec<CastMember> {
    details
        .cast()
        .iter()
        .take(MAX_CAST)
        .filter_map(|c| match (&c.name, &c.character) {
            (Some(name), Some(character)) => Some(CastMember {
                name: name.clone(),
                character: character.clone(),
            }),
            _ => None,
        })
        .collect()
}
