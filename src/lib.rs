//! reeltag - enrich a local video collection with catalog metadata.
//!
//! This library crate exposes the pipeline for the binary and for
//! integration testing.

pub mod cache;
pub mod config;
pub mod embedder;
pub mod index;
pub mod metadata;
pub mod pipeline;

pub use cache::{MetadataCache, PosterStore};
pub use embedder::Embedder;
pub use metadata::{CatalogError, CatalogProvider, Resolver};
pub use pipeline::{discover_media, Pipeline, ScanSummary};
