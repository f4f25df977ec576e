use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reeltag")]
#[command(author, version, about = "Tag a video collection with catalog metadata and cover art")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve metadata for every video under a directory and embed it
    Scan {
        /// Root directory of the collection
        #[arg(required = true)]
        directory: PathBuf,

        /// Catalog API key (overrides config and TMDB_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Path to the ffmpeg executable
        #[arg(long)]
        ffmpeg: Option<PathBuf>,

        /// Maximum catalog lookups in flight
        #[arg(long)]
        concurrency: Option<usize>,

        /// Do not write index.html after the scan
        #[arg(long)]
        no_index: bool,
    },

    /// Regenerate index.html from the cached metadata
    Index {
        /// Root directory of the collection
        #[arg(required = true)]
        directory: PathBuf,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
