//! Configuration module for Image-Trawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file is the common case.
//!
//! # Example
//!
//! ```no_run
//! use image_trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawl.toml")).unwrap();
//! println!("Results are paged {} at a time", config.download.page_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ClientConfig, Config, DownloadConfig, ProviderConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
