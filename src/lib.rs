//! Image-Trawl: query-driven image harvester
//!
//! This crate pages through an image search provider for a text query,
//! downloads the binary content of each result and stores the files in a
//! directory named after the query until the requested count is reached.

pub mod config;
pub mod download;
pub mod search;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Image-Trawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to read session token from {url}: {message}")]
    TokenParse { url: String, message: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    Fetch { url: String, status: u16 },

    #[error("Empty response body from {url}")]
    EmptyBody { url: String },

    #[error("Cannot determine working directory: {0}")]
    WorkingDir(#[source] std::io::Error),

    #[error("Cannot create target directory {}: {source}", .path.display())]
    TargetDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No new images after {pages} consecutive pages ({collected}/{requested} downloaded)")]
    Stalled {
        pages: u32,
        collected: usize,
        requested: usize,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Image-Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use download::{download_images, download_images_with, Coordinator, DownloadSummary};
pub use search::{get_image_urls, get_image_urls_with, ImageRecord, PageOutcome};
