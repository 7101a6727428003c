//! Search module for the image provider
//!
//! This module covers everything needed to turn a query into image metadata:
//! - Scraping the session token out of the search page
//! - Caching that token for the length of a run
//! - Requesting and decoding pages of results

mod record;
mod results;
mod token;

pub use record::{parse_results, ImageRecord, PageOutcome};
pub use results::{fetch_page, results_url, PageFetcher};
pub use token::{extract_token, resolve_token, token_page_url, CachedToken, TokenCache};

use crate::config::{validate, Config};
use crate::download::build_http_client;
use crate::{Result, TrawlError};

/// Returns the image records for `query` starting at result index `start`
///
/// Uses the default configuration. A new session token is resolved on every
/// call. Providers answer with up to 100 records per page, so `start = 15`
/// yields the results at indexes 15 onwards.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let records = image_trawl::get_image_urls("lighthouse", 0).await?;
/// for record in &records {
///     println!("{} -> {}", record.title, record.image_url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn get_image_urls(query: &str, start: u64) -> Result<Vec<ImageRecord>> {
    get_image_urls_with(&Config::default(), query, start).await
}

/// Same as [`get_image_urls`] with an explicit configuration
///
/// The configuration is validated before any request is made. A page that
/// cannot be decoded yields an empty list; the decode failure is logged as a
/// warning. Use [`PageFetcher`] to tell the two cases apart.
pub async fn get_image_urls_with(config: &Config, query: &str, start: u64) -> Result<Vec<ImageRecord>> {
    validate(config)?;
    if query.trim().is_empty() {
        return Err(TrawlError::InvalidRequest("query cannot be empty".to_string()));
    }

    let client = build_http_client(&config.client)?;
    let mut fetcher = PageFetcher::new(client, config.provider.clone());
    let outcome = fetcher.fetch(query, start).await?;

    Ok(outcome.into_records())
}
