//! # reeltag-av
//!
//! External tool management and container tagging for the reeltag
//! pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find ffmpeg from a
//!   configured path, `PATH`, or well-known install locations.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//! - **Workspace management** ([`Workspace`]) -- scratch directory lifecycle
//!   with atomic finalization onto the original path.
//! - **Tagging** ([`actions::write_tags`]) -- stream-copy remux that writes
//!   metadata fields and an attached cover image.

pub mod actions;
pub mod command;
pub mod tools;
pub mod workspace;

pub use actions::{write_tags, TagSet};
pub use command::{ToolCommand, ToolOutput};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use workspace::Workspace;
