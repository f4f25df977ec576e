//! Persistent metadata cache.
//!
//! Maps a file's path relative to the scanned root to its resolved
//! [`MetadataRecord`], and owns the poster storage directory. The index is
//! kept in memory during a scan and written once by [`MetadataCache::flush`].
//!
//! On-disk layout under the scanned root (names configurable via
//! `[library]`):
//!
//! ```text
//! .metadata/
//!   metadata.json        relative path -> record, 4-space indented, keys sorted
//!   posters/<id>.jpg     one image per catalog id
//! ```

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use reeltag_core::config::LibraryConfig;
use reeltag_core::MetadataRecord;
use serde::Serialize;
use tracing::{info, warn};

/// Directory of downloaded posters, named by catalog id.
#[derive(Debug, Clone)]
pub struct PosterStore {
    dir: PathBuf,
}

impl PosterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic location of the poster for `catalog_id`.
    pub fn path_for(&self, catalog_id: u64) -> PathBuf {
        self.dir.join(format!("{catalog_id}.jpg"))
    }

    /// Write image bytes for `catalog_id`. The file only appears once fully
    /// written.
    pub fn store(&self, catalog_id: u64, bytes: &[u8]) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let dest = self.path_for(catalog_id);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| e.error)?;
        Ok(dest)
    }
}

/// In-memory view of the persisted index.
#[derive(Debug)]
pub struct MetadataCache {
    index_path: PathBuf,
    posters: PosterStore,
    entries: BTreeMap<String, MetadataRecord>,
}

impl MetadataCache {
    /// Open the cache for a scanned root, creating the storage directories.
    pub fn open(root: &Path, library: &LibraryConfig) -> reeltag_core::Result<Self> {
        let posters_dir = library.posters_path(root);
        std::fs::create_dir_all(&posters_dir)?;
        Ok(Self::load(&library.index_path(root), &posters_dir))
    }

    /// Read the index at `index_path`.
    ///
    /// Never fails: a missing file yields an empty cache, and an unreadable
    /// or corrupt one is logged and also yields an empty cache.
    pub fn load(index_path: &Path, posters_dir: &Path) -> Self {
        let entries = match std::fs::read(index_path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        "Metadata index {} is corrupt, starting empty: {e}",
                        index_path.display()
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No metadata index at {}; starting empty", index_path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!(
                    "Failed to read metadata index {}, starting empty: {e}",
                    index_path.display()
                );
                BTreeMap::new()
            }
        };

        Self {
            index_path: index_path.to_path_buf(),
            posters: PosterStore::new(posters_dir),
            entries,
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataRecord> {
        self.entries.get(key)
    }

    /// Insert or overwrite a record. Not persisted until [`flush`](Self::flush).
    pub fn put(&mut self, key: impl Into<String>, record: MetadataRecord) {
        self.entries.insert(key.into(), record);
    }

    /// Atomically replace the on-disk index with the current contents.
    pub fn flush(&self) -> reeltag_core::Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.entries.serialize(&mut ser)?;
        buf.push(b'\n');

        let dir = self
            .index_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&buf)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.index_path).map_err(|e| e.error)?;

        info!(
            entries = self.entries.len(),
            "Wrote metadata index {}",
            self.index_path.display()
        );
        Ok(())
    }

    /// Where the poster for `catalog_id` is (or would be) stored.
    pub fn poster_storage_path(&self, catalog_id: u64) -> PathBuf {
        self.posters.path_for(catalog_id)
    }

    pub fn posters(&self) -> &PosterStore {
        &self.posters
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataRecord)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
