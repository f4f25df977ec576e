//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML and carries the
//! catalog, tool, library-layout and pipeline settings. Every section
//! defaults sensibly so a completely empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::Error;

/// Environment variable that overrides `catalog.api_key`.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub tools: ToolsConfig,
    pub library: LibraryConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Deserialize a `Config` from a TOML string and reject values the
    /// pipeline cannot run with.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))?;
        config.check()?;
        Ok(config)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Apply the [`API_KEY_ENV`] override when it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.catalog.api_key = key;
            }
        }
    }

    /// Hard errors: settings that make a scan impossible.
    fn check(&self) -> Result<()> {
        if self.pipeline.concurrency == 0 {
            return Err(Error::Validation(
                "pipeline.concurrency must be at least 1".into(),
            ));
        }
        if self.catalog.requests_per_second == 0 {
            return Err(Error::Validation(
                "catalog.requests_per_second must be at least 1".into(),
            ));
        }
        if self.library.metadata_dir.trim().is_empty() {
            return Err(Error::Validation("library.metadata_dir is empty".into()));
        }
        Ok(())
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.catalog.api_key.trim().is_empty() {
            warnings.push(format!(
                "catalog.api_key is empty; set it in the config or via {API_KEY_ENV}"
            ));
        }

        if let Some(ref p) = self.tools.ffmpeg_path {
            if !p.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; falling back to PATH",
                    p.display()
                ));
            }
        }

        if let Some(ref dir) = self.tools.scratch_dir {
            if !dir.is_dir() {
                warnings.push(format!(
                    "tools.scratch_dir {} is not a directory",
                    dir.display()
                ));
            }
        }

        if self.tools.timeout_secs == 0 {
            warnings.push("tools.timeout_secs is 0; every remux will time out".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Remote catalog (TMDB) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_key: String,
    pub language: String,
    pub base_url: String,
    pub image_base_url: String,
    pub timeout_secs: u64,
    pub requests_per_second: u32,
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: "en-US".into(),
            base_url: "https://api.themoviedb.org/3".into(),
            image_base_url: "https://image.tmdb.org/t/p/w500".into(),
            timeout_secs: 30,
            requests_per_second: 4,
        }
    }
}

/// External tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    /// Remux processes are killed after this many seconds.
    pub timeout_secs: u64,
    /// Where remux output is staged. Defaults to the media file's directory.
    pub scratch_dir: Option<PathBuf>,
}

impl ToolsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            timeout_secs: 3600,
            scratch_dir: None,
        }
    }
}

/// On-disk layout under the scanned root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub metadata_dir: String,
    pub index_file: String,
    pub posters_dir: String,
    pub html_index: bool,
}

impl LibraryConfig {
    /// `<root>/<metadata_dir>`
    pub fn metadata_path(&self, root: &Path) -> PathBuf {
        root.join(&self.metadata_dir)
    }

    /// `<root>/<metadata_dir>/<index_file>`
    pub fn index_path(&self, root: &Path) -> PathBuf {
        self.metadata_path(root).join(&self.index_file)
    }

    /// `<root>/<metadata_dir>/<posters_dir>`
    pub fn posters_path(&self, root: &Path) -> PathBuf {
        self.metadata_path(root).join(&self.posters_dir)
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            metadata_dir: ".metadata".into(),
            index_file: "metadata.json".into(),
            posters_dir: "posters".into(),
            html_index: true,
        }
    }
}

/// Orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum catalog resolutions in flight at once.
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}
