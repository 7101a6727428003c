//! Result page fetching
//!
//! One page is one request to the JSON results endpoint at a given offset.
//! Every request needs a session token; [`PageFetcher`] either resolves a
//! fresh one per page or reuses one through a [`TokenCache`].

use crate::config::ProviderConfig;
use crate::search::record::{parse_results, PageOutcome};
use crate::search::token::{resolve_token, TokenCache};
use crate::{Result, TrawlError};
use reqwest::{Client, StatusCode};
use url::Url;

/// Builds the results endpoint URL for one page
pub fn results_url(provider: &ProviderConfig, query: &str, token: &str, offset: u64) -> Result<Url> {
    let mut url = Url::parse(&provider.base_url)?;
    url.set_path("/i.js");
    url.query_pairs_mut()
        .append_pair("l", &provider.locale)
        .append_pair("o", "json")
        .append_pair("q", query)
        .append_pair("vqd", token)
        .append_pair("f", &provider.filter)
        .append_pair("s", &offset.to_string());
    Ok(url)
}

/// Requests one page of results with an already resolved token
///
/// Transport failures and non-success statuses are errors. A body that does
/// not decode is reported as [`PageOutcome::Malformed`], not as an error.
pub async fn fetch_page(
    client: &Client,
    provider: &ProviderConfig,
    query: &str,
    token: &str,
    offset: u64,
) -> Result<PageOutcome> {
    let url = results_url(provider, query, token, offset)?;
    tracing::debug!("Fetching results page at offset {}", offset);

    let response = client
        .get(url.clone())
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

    let outcome = parse_results(&body);
    if let PageOutcome::Malformed { reason } = &outcome {
        tracing::warn!(
            "Malformed results page for '{}' at offset {}: {}",
            query,
            offset,
            reason
        );
    }

    Ok(outcome)
}

/// Returns true for statuses the results endpoint uses to reject a token
fn is_token_rejection(status: u16) -> bool {
    status == StatusCode::UNAUTHORIZED.as_u16() || status == StatusCode::FORBIDDEN.as_u16()
}

/// Fetches result pages, taking care of the session token
pub struct PageFetcher {
    client: Client,
    provider: ProviderConfig,
    tokens: Option<TokenCache>,
}

impl PageFetcher {
    /// Creates a fetcher that resolves a new token for every page
    pub fn new(client: Client, provider: ProviderConfig) -> Self {
        Self {
            client,
            provider,
            tokens: None,
        }
    }

    /// Creates a fetcher that reuses tokens through `cache`
    pub fn with_cache(client: Client, provider: ProviderConfig, cache: TokenCache) -> Self {
        Self {
            client,
            provider,
            tokens: Some(cache),
        }
    }

    /// Fetches the page of `query` starting at `offset`
    ///
    /// With a cache, a token the endpoint rejects (401/403) is dropped and
    /// resolved again once before the request is retried.
    pub async fn fetch(&mut self, query: &str, offset: u64) -> Result<PageOutcome> {
        let Some(cache) = self.tokens.as_mut() else {
            let token = resolve_token(&self.client, &self.provider, query).await?;
            return fetch_page(&self.client, &self.provider, query, &token, offset).await;
        };

        let (token, reused) = match cache.get(query) {
            Some(token) => (token.to_string(), true),
            None => {
                let token = resolve_token(&self.client, &self.provider, query).await?;
                cache.store(query, &token);
                (token, false)
            }
        };

        match fetch_page(&self.client, &self.provider, query, &token, offset).await {
            Err(TrawlError::Fetch { status, .. }) if reused && is_token_rejection(status) => {
                tracing::warn!(
                    "Cached session token rejected (HTTP {}), resolving a new one",
                    status
                );
                cache.invalidate();
                let token = resolve_token(&self.client, &self.provider, query).await?;
                cache.store(query, &token);
                fetch_page(&self.client, &self.provider, query, &token, offset).await
            }
            other => other,
        }
    }
}
