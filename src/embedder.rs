//! Writes a [`MetadataRecord`] into a media container in place.
//!
//! The rewrite happens in a scratch [`Workspace`]; the original is replaced
//! by a rename only after ffmpeg exits successfully, so it is either fully
//! replaced or left byte-for-byte untouched.

use std::path::{Path, PathBuf};

use reeltag_av::{write_tags, TagSet, ToolConfig, Workspace};
use reeltag_core::MetadataRecord;
use tracing::{error, info};

/// Embeds records into files using ffmpeg.
#[derive(Debug, Clone)]
pub struct Embedder {
    ffmpeg: ToolConfig,
    scratch_dir: Option<PathBuf>,
}

impl Embedder {
    pub fn new(ffmpeg: ToolConfig) -> Self {
        Self {
            ffmpeg,
            scratch_dir: None,
        }
    }

    /// Stage output under `dir` instead of beside each file.
    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Metadata fields and cover art for a record.
    ///
    /// The poster is attached only if it still exists on disk.
    pub fn tags_for(record: &MetadataRecord) -> TagSet {
        let mut tags = TagSet::new()
            .field("title", &record.title)
            .field("date", &record.year)
            .field("description", &record.overview)
            .field("genre", record.genres.join(", "))
            .field("rating", record.rating.to_string());

        if !record.directors.is_empty() {
            tags = tags.field("director", record.directors.join(", "));
        }

        let actors: Vec<&str> = record
            .cast
            .iter()
            .map(|c| c.name.as_str())
            .filter(|n| !n.is_empty())
            .collect();
        if !actors.is_empty() {
            tags = tags.field("artist", actors.join(", "));
        }

        if let Some(poster) = record.existing_poster() {
            tags = tags.cover_art(poster);
        }

        tags
    }

    /// Embed a record, logging any failure. Returns `true` on success.
    pub async fn embed(&self, file: &Path, record: &MetadataRecord) -> bool {
        match self.try_embed(file, record).await {
            Ok(()) => {
                info!(file = %file.display(), "metadata applied");
                true
            }
            Err(e) => {
                error!(file = %file.display(), "failed to apply metadata: {e}");
                false
            }
        }
    }

    /// Embed a record, returning the failure cause.
    pub async fn try_embed(&self, file: &Path, record: &MetadataRecord) -> reeltag_core::Result<()> {
        let workspace = match &self.scratch_dir {
            Some(dir) => Workspace::new_in(file, dir)?,
            None => Workspace::new(file)?,
        };

        let tags = Self::tags_for(record);
        write_tags(&workspace, &self.ffmpeg, &tags).await?;
        workspace.finalize()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reeltag_core::{CastMember, MediaKind};

    fn dune() -> MetadataRecord {
        MetadataRecord {
            catalog_id: 438631,
            title: "Dune".into(),
            original_title: "Dune".into(),
            year: "2021".into(),
            overview: "Paul Atreides...".into(),
            local_poster_path: None,
            genres: vec!["Adventure".into(), "Drama".into(), "Science Fiction".into()],
            rating: 7.8,
            kind: MediaKind::Movie,
            directors: vec!["Denis Villeneuve".into()],
            cast: vec![
                CastMember {
                    name: "Timothée Chalamet".into(),
                    character: "Paul Atreides".into(),
                },
                CastMember {
                    name: "Rebecca Ferguson".into(),
                    character: "Lady Jessica".into(),
                },
            ],
            runtime_minutes: 155,
        }
    }

    #[test]
    fn tags_cover_required_fields_in_order() {
        let tags = Embedder::tags_for(&dune());
        let keys: Vec<&str> = tags.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["title", "date", "description", "genre", "rating", "director", "artist"]
        );
        assert_eq!(tags.get("genre"), Some("Adventure, Drama, Science Fiction"));
        assert_eq!(tags.get("rating"), Some("7.8"));
        assert_eq!(tags.get("artist"), Some("Timothée Chalamet, Rebecca Ferguson"));
        assert!(tags.cover_art.is_none());
    }

    #[test]
    fn optional_fields_are_omitted_when_empty() {
        let mut record = dune();
        record.directors.clear();
        record.cast = vec![CastMember {
            name: String::new(),
            character: "Nobody".into(),
        }];
        let tags = Embedder::tags_for(&record);
        assert_eq!(tags.get("director"), None);
        assert_eq!(tags.get("artist"), None);
    }

    #[test]
    fn missing_poster_is_treated_as_absent() {
        let mut record = dune();
        record.local_poster_path = Some(PathBuf::from("/nonexistent/438631.jpg"));
        assert!(Embedder::tags_for(&record).cover_art.is_none());
    }

    #[test]
    fn existing_poster_is_attached() {
        let dir = tempfile::tempdir().unwrap();
        let poster = dir.path().join("438631.jpg");
        std::fs::write(&poster, b"jpeg").unwrap();
        let mut record = dune();
        record.local_poster_path = Some(poster.clone());
        assert_eq!(Embedder::tags_for(&record).cover_art, Some(poster));
    }

    #[tokio::test]
    async fn missing_tool_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Dune (2021).mkv");
        std::fs::write(&file, b"original").unwrap();

        let embedder = Embedder::new(ToolConfig::at("ffmpeg", dir.path().join("no-such-ffmpeg")));
        assert!(!embedder.embed(&file, &dune()).await);
        assert_eq!(std::fs::read(&file).unwrap(), b"original");
    }
}
