//! Download coordinator - main download orchestration logic
//!
//! This module contains the loop that turns result pages into files:
//! - Creating the query directory
//! - Paging through results at a fixed stride
//! - Fetching, naming and writing each image
//! - Stopping at the requested count, or when the provider stops yielding

use crate::config::{validate, Config};
use crate::download::fetcher::{build_http_client, fetch_image_bytes};
use crate::download::naming::output_file_name;
use crate::download::stats::DownloadStats;
use crate::download::writer::{create_target_dir, write_image};
use crate::search::{ImageRecord, PageFetcher, PageOutcome, TokenCache};
use crate::{Result, TrawlError};
use reqwest::Client;
use std::path::{Path, PathBuf};

/// Outcome of a completed download run
#[derive(Debug, Clone)]
pub struct DownloadSummary {
    /// Directory the files were written to
    pub target_dir: PathBuf,

    /// Paths of the written files, in download order
    pub manifest: Vec<PathBuf>,

    pub stats: DownloadStats,
}

/// Main download coordinator structure
pub struct Coordinator {
    config: Config,
    client: Client,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(TrawlError)` - Invalid configuration, or the HTTP client could not be built
    pub fn new(config: Config) -> Result<Self> {
        validate(&config)?;
        let client = build_http_client(&config.client)?;
        Ok(Self { config, client })
    }

    /// Returns the configuration this coordinator runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Downloads `number_of_images` images for `query`
    ///
    /// 1. Creates `<root>/<escaped query>`; an existing directory is fatal
    /// 2. Fetches result pages at offsets 0, page_size, 2 * page_size, ...
    /// 3. For each record: fetch bytes, pick a name, write the file
    /// 4. Returns as soon as the manifest holds `number_of_images` paths
    ///
    /// A failing page fetch aborts the run. A failing image fetch or write
    /// only skips that record. With `max_stalled_pages` set, that many
    /// consecutive pages without a new file abort the run with
    /// `TrawlError::Stalled`; with it at 0 the loop pages forever until
    /// enough images are found.
    pub async fn run(&self, query: &str, number_of_images: usize) -> Result<DownloadSummary> {
        if query.trim().is_empty() {
            return Err(TrawlError::InvalidRequest("query cannot be empty".to_string()));
        }
        if number_of_images == 0 {
            return Err(TrawlError::InvalidRequest(
                "number of images must be greater than zero".to_string(),
            ));
        }

        let settings = &self.config.download;
        let root = match &settings.output_root {
            Some(root) => root.clone(),
            None => std::env::current_dir().map_err(TrawlError::WorkingDir)?,
        };
        let target_dir = create_target_dir(&root, query).await?;

        tracing::info!(
            "Downloading {} images for '{}' into {}",
            number_of_images,
            query,
            target_dir.display()
        );

        let mut pages = self.page_fetcher();
        let page_size = u64::from(settings.page_size);
        let mut manifest = Vec::with_capacity(number_of_images);
        let mut stats = DownloadStats::default();
        let mut offset: u64 = 0;
        let mut stalled_pages: u32 = 0;

        while manifest.len() < number_of_images {
            let outcome = pages.fetch(query, offset).await?;
            stats.pages_fetched += 1;
            match &outcome {
                PageOutcome::Exhausted => stats.empty_pages += 1,
                PageOutcome::Malformed { .. } => stats.malformed_pages += 1,
                PageOutcome::Records(_) => {}
            }

            let records = outcome.into_records();
            tracing::debug!("Offset {}: {} records", offset, records.len());

            let before = manifest.len();
            for record in &records {
                stats.records_seen += 1;
                if let Some(path) = self.download_record(record, &target_dir, &mut stats).await {
                    manifest.push(path);
                    if manifest.len() >= number_of_images {
                        break;
                    }
                }
            }

            if manifest.len() > before {
                stalled_pages = 0;
            } else {
                stalled_pages += 1;
                if settings.max_stalled_pages > 0 && stalled_pages >= settings.max_stalled_pages {
                    tracing::warn!(
                        "Giving up on '{}' after {} pages without progress: {}",
                        query,
                        stalled_pages,
                        stats
                    );
                    return Err(TrawlError::Stalled {
                        pages: stalled_pages,
                        collected: manifest.len(),
                        requested: number_of_images,
                    });
                }
            }

            tracing::info!(
                "Progress: {}/{} images after {} pages",
                manifest.len(),
                number_of_images,
                stats.pages_fetched
            );

            offset = offset.saturating_add(page_size);
        }

        tracing::info!("Download completed: {}", stats);

        Ok(DownloadSummary {
            target_dir,
            manifest,
            stats,
        })
    }

    fn page_fetcher(&self) -> PageFetcher {
        let provider = self.config.provider.clone();
        if self.config.download.cache_token {
            let cache = TokenCache::new(self.config.download.token_ttl_secs);
            PageFetcher::with_cache(self.client.clone(), provider, cache)
        } else {
            PageFetcher::new(self.client.clone(), provider)
        }
    }

    /// Fetches and stores one record, returning its path on success
    async fn download_record(
        &self,
        record: &ImageRecord,
        target_dir: &Path,
        stats: &mut DownloadStats,
    ) -> Option<PathBuf> {
        let bytes = match fetch_image_bytes(&self.client, &record.image_url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!("Skipping '{}': {}", record.title, e);
                stats.fetch_failures += 1;
                return None;
            }
        };

        let path = target_dir.join(output_file_name(&record.title, &record.image_url));

        if let Err(e) = write_image(&path, &bytes, self.config.download.atomic_writes).await {
            tracing::warn!("Skipping '{}': {}", record.title, e);
            stats.write_failures += 1;
            return None;
        }

        tracing::debug!("Saved {} ({} bytes)", path.display(), bytes.len());
        stats.downloaded += 1;
        Some(path)
    }
}

/// Runs a download with the given configuration and returns the manifest
///
/// # Example
///
/// ```no_run
/// use image_trawl::{download_images_with, Config};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let paths = download_images_with(Config::default(), "lighthouse", 20).await?;
/// println!("{} files written", paths.len());
/// # Ok(())
/// # }
/// ```
pub async fn download_images_with(
    config: Config,
    query: &str,
    number_of_images: usize,
) -> Result<Vec<PathBuf>> {
    let coordinator = Coordinator::new(config)?;
    let summary = coordinator.run(query, number_of_images).await?;
    Ok(summary.manifest)
}

/// Downloads `number_of_images` images for `query` into `./<escaped query>/`
///
/// Uses the default configuration.
pub async fn download_images(query: &str, number_of_images: usize) -> Result<Vec<PathBuf>> {
    download_images_with(Config::default(), query, number_of_images).await
}
