//! Remote metadata resolution.
//!
//! # Module layout
//!
//! - [`provider`] -- the [`CatalogProvider`] trait, detail schema and [`CatalogError`].
//! - [`providers`] -- concrete providers (TMDB).
//! - [`resolver`] -- search, detail and poster download into a [`MetadataRecord`](reeltag_core::MetadataRecord).

pub mod provider;
pub mod providers;
pub mod resolver;

pub use provider::{CatalogDetails, CatalogError, CatalogProvider, SearchHit};
pub use resolver::{build_record, Resolver};
