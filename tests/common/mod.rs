//! Shared helpers for integration tests.
//!
//! Provides [`MockCatalog`], an in-memory [`CatalogProvider`] that counts
//! calls, and fake `ffmpeg` scripts for exercising the embedder without a
//! real ffmpeg install.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reeltag::metadata::provider::{
    CastCredit, CatalogDetails, CatalogError, CatalogProvider, Credits, CrewCredit, Genre,
    SearchHit,
};
use reeltag_core::{MediaKind, MetadataRecord};

/// In-memory catalog keyed by (kind, lowercase title).
#[derive(Default)]
pub struct MockCatalog {
    entries: HashMap<(MediaKind, String), CatalogDetails>,
    images: HashMap<String, Vec<u8>>,
    pub searches: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, kind: MediaKind, title: &str, details: CatalogDetails) -> Self {
        self.entries.insert((kind, title.to_lowercase()), details);
        self
    }

    pub fn with_image(mut self, path: &str, bytes: &[u8]) -> Self {
        self.images.insert(path.to_string(), bytes.to_vec());
        self
    }

    /// Total remote calls of any kind.
    pub fn calls(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
            + self.detail_calls.load(Ordering::SeqCst)
            + self.image_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogProvider for MockCatalog {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(
        &self,
        kind: MediaKind,
        title: &str,
        _year: Option<u16>,
    ) -> Result<Vec<SearchHit>, CatalogError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .entries
            .get(&(kind, title.to_lowercase()))
            .map(|d| vec![SearchHit { id: d.id }])
            .unwrap_or_default())
    }

    async fn details(&self, kind: MediaKind, id: u64) -> Result<CatalogDetails, CatalogError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.entries
            .iter()
            .find(|((k, _), d)| *k == kind && d.id == id)
            .map(|(_, d)| d.clone())
            .ok_or_else(|| CatalogError::NotFound(format!("{kind}/{id}")))
    }

    async fn fetch_image(&self, path: &str) -> Result<Vec<u8>, CatalogError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| CatalogError::Transport(format!("image {path} unavailable")))
    }
}

/// Detail response for Dune (2021).
pub fn dune_details() -> CatalogDetails {
    CatalogDetails {
        id: 438631,
        title: Some("Dune".into()),
        original_title: Some("Dune".into()),
        release_date: Some("2021-09-15".into()),
        overview: Some("Paul Atreides, a brilliant and gifted young man...".into()),
        poster_path: Some("/d5NXSklXo0qyIYkgV94XAgMIckC.jpg".into()),
        genres: Some(
            ["Adventure", "Drama", "Science Fiction"]
                .iter()
                .map(|g| Genre {
                    name: Some(g.to_string()),
                })
                .collect(),
        ),
        vote_average: Some(7.8),
        runtime: Some(155),
        credits: Some(Credits {
            cast: Some(vec![
                CastCredit {
                    name: Some("Timothée Chalamet".into()),
                    character: Some("Paul Atreides".into()),
                },
                CastCredit {
                    name: Some("Rebecca Ferguson".into()),
                    character: Some("Lady Jessica Atreides".into()),
                },
            ]),
            crew: Some(vec![CrewCredit {
                name: Some("Denis Villeneuve".into()),
                job: Some("Director".into()),
            }]),
        }),
        ..Default::default()
    }
}

/// Detail response for a series whose episode runtime list is empty.
pub fn series_details() -> CatalogDetails {
    CatalogDetails {
        id: 1396,
        name: Some("Breaking Bad".into()),
        original_name: Some("Breaking Bad".into()),
        first_air_date: Some("2008-01-20".into()),
        episode_run_time: Some(vec![]),
        vote_average: Some(8.9),
        credits: Some(Credits {
            cast: None,
            crew: Some(vec![CrewCredit {
                name: Some("Vince Gilligan".into()),
                job: Some("Creator".into()),
            }]),
        }),
        ..Default::default()
    }
}

/// A fully populated record, independent of any catalog.
pub fn sample_record() -> MetadataRecord {
    MetadataRecord {
        catalog_id: 438631,
        title: "Dune".into(),
        original_title: "Dune".into(),
        year: "2021".into(),
        overview: "Paul Atreides...".into(),
        local_poster_path: None,
        genres: vec!["Adventure".into(), "Drama".into()],
        rating: 7.8,
        kind: MediaKind::Movie,
        directors: vec!["Denis Villeneuve".into()],
        cast: vec![],
        runtime_minutes: 155,
    }
}

#[cfg(unix)]
fn write_script(path: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_path_buf()
}

/// A fake ffmpeg that copies the first `-i` input to the output path (its
/// last argument), appends a marker line, and logs its arguments to
/// `<dir>/ffmpeg.log`. Returns `(script, log)`.
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &Path) -> (PathBuf, PathBuf) {
    copying_ffmpeg(dir, "ffmpeg", "")
}

/// Like [`fake_ffmpeg`], but each run sleeps `seconds` before copying.
#[cfg(unix)]
pub fn slow_ffmpeg(dir: &Path, seconds: f32) -> (PathBuf, PathBuf) {
    copying_ffmpeg(dir, "ffmpeg-slow", &format!("sleep {seconds}\n"))
}

#[cfg(unix)]
fn copying_ffmpeg(dir: &Path, name: &str, prelude: &str) -> (PathBuf, PathBuf) {
    let log = dir.join(format!("{name}.log"));
    let body = format!(
        r#"{prelude}echo "$@" >> '{log}'
input=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-i" ] && [ -z "$input" ]; then input="$arg"; fi
  prev="$arg"
done
cp "$input" "$prev" || exit 1
echo tagged >> "$prev"
"#,
        log = log.display()
    );
    (write_script(&dir.join(name), &body), log)
}

/// A fake ffmpeg that always fails with a diagnostic on stderr.
#[cfg(unix)]
pub fn failing_ffmpeg(dir: &Path) -> PathBuf {
    write_script(
        &dir.join("ffmpeg-broken"),
        "echo 'Invalid data found when processing input' >&2\nexit 1\n",
    )
}
