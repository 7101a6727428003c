//! Download module for image retrieval and storage
//!
//! This module contains the core download logic, including:
//! - HTTP client construction and image byte fetching
//! - Output naming from titles and URL extensions
//! - Writing files into the per-query directory
//! - The paging loop that ties it all together

mod coordinator;
mod fetcher;
mod naming;
mod stats;
mod writer;

pub use coordinator::{download_images, download_images_with, Coordinator, DownloadSummary};
pub use fetcher::{build_http_client, fetch_image_bytes};
pub use naming::{
    escape_component, output_file_name, pick_extension, DEFAULT_EXTENSION, KNOWN_EXTENSIONS,
};
pub use stats::DownloadStats;
pub use writer::{create_target_dir, write_image};
