//! reeltag-core: shared domain types, errors, and configuration.
//!
//! This crate is the foundational dependency for the other reeltag crates.
//! It defines the [`MetadataRecord`] schema produced by the resolver,
//! persisted by the cache and consumed by the embedder, the unified
//! [`Error`] type, and the application [`Config`].

pub mod config;
pub mod error;
pub mod media;

pub use config::Config;
pub use error::{Error, Result};
pub use media::*;
