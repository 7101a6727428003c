//! Image-Trawl main entry point
//!
//! This is the command-line interface for the Image-Trawl image harvester.

use clap::Parser;
use image_trawl::config::{load_config_with_hash, Config};
use image_trawl::{get_image_urls_with, Coordinator};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Image-Trawl: query-driven image harvester
///
/// Image-Trawl pages through image search results for a query and saves
/// the images into a directory named after the query.
#[derive(Parser, Debug)]
#[command(name = "image-trawl")]
#[command(version)]
#[command(about = "Download images for a search query", long_about = None)]
struct Cli {
    /// Search query; also names the output directory
    #[arg(value_name = "QUERY")]
    query: String,

    /// Number of images to download
    #[arg(short = 'n', long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    count: u32,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Print one page of image metadata as JSON lines instead of downloading
    #[arg(long)]
    list: bool,

    /// Result offset for --list
    #[arg(long, default_value_t = 0, requires = "list")]
    offset: u64,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    if cli.list {
        handle_list(&config, &cli.query, cli.offset).await?;
    } else {
        handle_download(config, &cli.query, cli.count).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("image_trawl=info,warn"),
            1 => EnvFilter::new("image_trawl=debug,info"),
            2 => EnvFilter::new("image_trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles --list: prints one page of records as JSON lines
async fn handle_list(
    config: &Config,
    query: &str,
    offset: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = get_image_urls_with(config, query, offset).await?;
    tracing::info!("{} records at offset {}", records.len(), offset);

    for record in &records {
        println!("{}", serde_json::to_string(record)?);
    }

    Ok(())
}

/// Handles the main download operation
async fn handle_download(
    config: Config,
    query: &str,
    count: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = Coordinator::new(config)?;

    match coordinator.run(query, count as usize).await {
        Ok(summary) => {
            tracing::info!(
                "Saved {} images to {}",
                summary.manifest.len(),
                summary.target_dir.display()
            );
            for path in &summary.manifest {
                println!("{}", path.display());
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Download failed: {}", e);
            Err(e.into())
        }
    }
}
