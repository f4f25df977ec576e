//! Scan orchestration: walk, cache lookup, resolve, embed, flush.
//!
//! Cache misses are resolved on spawned tasks with at most `concurrency`
//! catalog lookups in flight. Results come back in traversal order, and cache writes and
//! embedding happen one file at a time on the calling task, so no two
//! writers ever touch the cache or the same file.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reeltag_av::workspace::SCRATCH_PREFIX;
use reeltag_core::{is_supported_container, MetadataRecord};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::cache::MetadataCache;
use crate::embedder::Embedder;
use crate::metadata::Resolver;

/// Counters for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub files_found: usize,
    pub cache_hits: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub embedded: usize,
    pub embed_failures: usize,
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files: {} cached, {} new, {} unresolved; {} embedded, {} failed",
            self.files_found,
            self.cache_hits,
            self.resolved,
            self.unresolved,
            self.embedded,
            self.embed_failures
        )
    }
}

/// Where a file's record came from.
enum Lookup {
    Cached(MetadataRecord),
    Resolved(Option<MetadataRecord>),
}

/// A lookup that has been started but not yet collected.
enum Pending {
    Cached(MetadataRecord),
    Spawned(JoinHandle<Option<MetadataRecord>>),
}

/// Drives resolution and embedding over a directory tree.
pub struct Pipeline {
    resolver: Resolver,
    embedder: Embedder,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(resolver: Resolver, embedder: Embedder, concurrency: usize) -> Self {
        Self {
            resolver,
            embedder,
            concurrency: concurrency.max(1),
        }
    }

    /// Process every supported file under `root` and flush the cache once.
    ///
    /// Per-file failures are logged and counted; only a failed flush is
    /// returned as an error.
    pub async fn run(&self, root: &Path, cache: &mut MetadataCache) -> Result<ScanSummary> {
        info!("Scanning directory: {}", root.display());

        let mut skip: Vec<PathBuf> = vec![cache.posters().dir().to_path_buf()];
        if let Some(metadata_dir) = cache.index_path().parent() {
            skip.push(metadata_dir.to_path_buf());
        }

        let files = discover_media(root, &skip);
        let mut summary = ScanSummary {
            files_found: files.len(),
            ..Default::default()
        };
        info!("Found {} media files", files.len());

        let jobs: Vec<(PathBuf, String, Option<MetadataRecord>)> = files
            .into_iter()
            .map(|path| {
                let key = cache_key(root, &path);
                let cached = cache.get(&key).cloned();
                (path, key, cached)
            })
            .collect();

        // Lookups run on their own tasks so they keep making progress while
        // the loop below is busy remuxing. At most `concurrency` are started
        // ahead of the consumer.
        let mut lookups = stream::iter(jobs)
            .map(|(path, key, cached)| {
                let pending = match cached {
                    Some(record) => Pending::Cached(record),
                    None => {
                        let stem = path
                            .file_stem()
                            .map(|s| s.to_string_lossy().to_string())
                            .unwrap_or_default();
                        let query = reeltag_parser::parse(&stem);
                        debug!(file = %key, title = %query.title, year = ?query.year, kind = %query.kind, "parsed filename");
                        let resolver = self.resolver.clone();
                        Pending::Spawned(tokio::spawn(async move { resolver.resolve(&query).await }))
                    }
                };
                async move {
                    let lookup = match pending {
                        Pending::Cached(record) => Lookup::Cached(record),
                        Pending::Spawned(task) => match task.await {
                            Ok(record) => Lookup::Resolved(record),
                            Err(e) => {
                                error!(file = %key, "lookup task failed: {e}");
                                Lookup::Resolved(None)
                            }
                        },
                    };
                    (path, key, lookup)
                }
            })
            .buffered(self.concurrency);

        while let Some((path, key, lookup)) = lookups.next().await {
            let record = match lookup {
                Lookup::Cached(record) => {
                    debug!(file = %key, "cache hit");
                    summary.cache_hits += 1;
                    record
                }
                Lookup::Resolved(Some(record)) => {
                    summary.resolved += 1;
                    cache.put(key.clone(), record.clone());
                    record
                }
                Lookup::Resolved(None) => {
                    warn!(file = %key, "no metadata; skipping");
                    summary.unresolved += 1;
                    continue;
                }
            };

            if self.embedder.embed(&path, &record).await {
                summary.embedded += 1;
            } else {
                summary.embed_failures += 1;
            }
        }

        cache
            .flush()
            .with_context(|| format!("Failed to write {}", cache.index_path().display()))?;

        info!("Scan complete: {summary}");
        Ok(summary)
    }
}

/// Supported media files under `root`, in walk order.
///
/// Directories listed in `skip` and scratch workspaces are not descended
/// into.
pub fn discover_media(root: &Path, skip: &[PathBuf]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            let scratch = entry
                .file_name()
                .to_string_lossy()
                .starts_with(SCRATCH_PREFIX);
            !scratch && !skip.iter().any(|s| s == entry.path())
        })
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_supported_container(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Path relative to the scanned root, used as the cache key.
fn cache_key(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}
