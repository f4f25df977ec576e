mod cli;

use reeltag::{
    config, index, metadata::providers::TmdbProvider, Embedder, MetadataCache, Pipeline, Resolver,
};
use reeltag_av::ToolRegistry;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct ScanOptions {
    directory: PathBuf,
    api_key: Option<String>,
    ffmpeg: Option<PathBuf>,
    concurrency: Option<usize>,
    no_index: bool,
}

async fn scan(opts: ScanOptions, config_path: Option<&Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(key) = opts.api_key {
        config.catalog.api_key = key;
    }
    if let Some(ffmpeg) = opts.ffmpeg {
        config.tools.ffmpeg_path = Some(ffmpeg);
    }
    if let Some(concurrency) = opts.concurrency {
        config.pipeline.concurrency = concurrency.max(1);
    }

    // Configuration errors abort before any file is touched.
    if config.catalog.api_key.trim().is_empty() {
        anyhow::bail!(
            "No catalog API key; pass --api-key, set {} or catalog.api_key",
            config::API_KEY_ENV
        );
    }

    let tools = ToolRegistry::discover(&config.tools);
    let ffmpeg = tools.require("ffmpeg")?.clone();
    tracing::info!("Using ffmpeg at {}", ffmpeg.path.display());

    let root = opts
        .directory
        .canonicalize()
        .with_context(|| format!("Cannot access directory {:?}", opts.directory))?;
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let mut cache = MetadataCache::open(&root, &config.library)
        .with_context(|| format!("Failed to open metadata store under {}", root.display()))?;
    tracing::info!("Loaded {} cached records", cache.len());

    let provider = TmdbProvider::new(&config.catalog)?;
    let resolver = Resolver::new(Arc::new(provider), cache.posters().clone());
    let embedder = Embedder::new(ffmpeg).with_scratch_dir(config.tools.scratch_dir.clone());
    let pipeline = Pipeline::new(resolver, embedder, config.pipeline.concurrency);

    let summary = pipeline.run(&root, &mut cache).await?;
    println!("{summary}");

    if config.library.html_index && !opts.no_index {
        let path = index::write_index(&root, &cache)?;
        println!("Index written to {}", path.display());
    }

    Ok(())
}

fn write_index(directory: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let root = directory
        .canonicalize()
        .with_context(|| format!("Cannot access directory {:?}", directory))?;

    let cache = MetadataCache::load(
        &config.library.index_path(&root),
        &config.library.posters_path(&root),
    );
    let path = index::write_index(&root, &cache)?;
    println!("Index of {} records written to {}", cache.len(), path.display());
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut ffmpeg_ok = false;

    for tool in &tools {
        let status = if tool.available { "✓" } else { "✗" };
        if tool.name == "ffmpeg" {
            ffmpeg_ok = tool.available;
        }

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if ffmpeg_ok {
        println!("All required tools are available!");
    } else {
        println!("ffmpeg is missing. Install it or set tools.ffmpeg_path.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Catalog: {} ({})", config.catalog.base_url, config.catalog.language);
    println!(
        "  API key: {}",
        if config.catalog.api_key.is_empty() { "not set" } else { "set" }
    );
    println!("  Requests/second: {}", config.catalog.requests_per_second);
    println!("  Concurrency: {}", config.pipeline.concurrency);
    println!(
        "  Metadata store: {}/{}",
        config.library.metadata_dir, config.library.index_file
    );

    for warning in config.validate() {
        println!("  ! {warning}");
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reeltag=trace,reeltag_av=trace,reeltag_core=debug,reeltag_parser=debug".to_string()
        } else {
            "reeltag=info,reeltag_av=info,reeltag_core=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan {
            directory,
            api_key,
            ffmpeg,
            concurrency,
            no_index,
        } => {
            let opts = ScanOptions {
                directory,
                api_key,
                ffmpeg,
                concurrency,
                no_index,
            };
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(scan(opts, cli.config.as_deref()))
        }
        Commands::Index { directory } => write_index(&directory, cli.config.as_deref()),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("reeltag {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
