//! Configuration loading for the `reeltag` binary.
//!
//! The schema lives in [`reeltag_core::config`]; this module finds the file,
//! applies the environment override and wraps failures with context.

pub use reeltag_core::config::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Locations tried, in order, when no `--config` is given.
const DEFAULT_PATHS: &[&str] = &[
    "./reeltag.toml",
    "./config.toml",
    "~/.config/reeltag/config.toml",
];

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config = Config::from_toml(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    config.apply_env();

    for warning in config.validate() {
        tracing::warn!("{warning}");
    }

    Ok(config)
}

/// Load config from `custom_path`, else the default locations, else defaults.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {}", path.display());
            return load_config(path);
        }
    }

    let mut config = Config::default();
    config.apply_env();
    Ok(config)
}
