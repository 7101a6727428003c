//! HTTP fetcher implementation
//!
//! This module handles the HTTP side of downloading:
//! - Building the HTTP client shared by search and download requests
//! - GET requests for raw image bytes
//! - Error classification (status, empty body, transport)

use crate::config::ClientConfig;
use crate::{Result, TrawlError};
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP client configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use image_trawl::config::ClientConfig;
/// use image_trawl::download::build_http_client;
///
/// let client = build_http_client(&ClientConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ClientConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches the raw bytes behind an image URL
///
/// # Request Flow
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with a body | `Ok(bytes)` |
/// | Any other status | `TrawlError::Fetch` |
/// | 2xx without a body | `TrawlError::EmptyBody` |
/// | Connection, timeout, invalid URL | `TrawlError::Http` |
///
/// The orchestrator treats every error here as "skip this record".
pub async fn fetch_image_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| TrawlError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(TrawlError::Fetch {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|source| TrawlError::Http {
        url: url.to_string(),
        source,
    })?;

    if body.is_empty() {
        return Err(TrawlError::EmptyBody {
            url: url.to_string(),
        });
    }

    Ok(body.to_vec())
}
