//! Session token resolution and per-run caching
//!
//! The results endpoint only answers requests that carry a short-lived token.
//! The token is embedded in the regular search page as `<marker>'<value>'`
//! and has to be scraped out of it before the first page can be requested.

use crate::config::ProviderConfig;
use crate::{Result, TrawlError};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use url::Url;

/// Upper bound on the cache lifetime, keeps the chrono conversion in range
const MAX_TOKEN_TTL_SECS: i64 = 86_400 * 365;

/// Builds the URL of the search page that carries the session token
pub fn token_page_url(provider: &ProviderConfig, query: &str) -> Result<Url> {
    let mut url = Url::parse(&provider.base_url)?;
    url.set_path("/");
    url.query_pairs_mut()
        .append_pair("q", query)
        .append_pair("iax", "images")
        .append_pair("ia", "images");
    Ok(url)
}

/// Extracts the quoted value following `marker` in `document`
///
/// Occurrences of the marker that are not followed by a quote (such as
/// `&vqd=...&` inside a link) are skipped. The first quoted occurrence
/// decides; either quote style is accepted and the value ends at the
/// matching quote. No marker at all, no quoted occurrence, an unterminated
/// quote or an empty value all fail with a description of what was wrong.
pub fn extract_token<'a>(document: &'a str, marker: &str) -> std::result::Result<&'a str, String> {
    let mut found_marker = false;

    for (start, _) in document.match_indices(marker) {
        found_marker = true;
        let rest = &document[start + marker.len()..];

        let quote = match rest.chars().next() {
            Some(c @ ('\'' | '"')) => c,
            _ => continue,
        };
        let value = &rest[quote.len_utf8()..];

        let end = value
            .find(quote)
            .ok_or_else(|| "unterminated token value".to_string())?;
        let token = &value[..end];

        if token.is_empty() {
            return Err("empty token value".to_string());
        }

        return Ok(token);
    }

    if found_marker {
        Err(format!("no quoted value after marker '{}'", marker))
    } else {
        Err(format!("marker '{}' not found in document", marker))
    }
}

/// Fetches the search page for `query` and scrapes the session token from it
///
/// # Errors
///
/// * `TrawlError::Http` - transport failure
/// * `TrawlError::Fetch` - the search page answered with a non-success status
/// * `TrawlError::TokenParse` - the page did not contain a usable token
pub async fn resolve_token(client: &Client, provider: &ProviderConfig, query: &str) -> Result<String> {
    let url = token_page_url(provider, query)?;
    tracing::debug!("Resolving session token from {}", url);

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

    let document = response.text().await.map_err(|source| TrawlError::Http {
        url: url.to_string(),
        source,
    })?;

    let token = extract_token(&document, &provider.token_marker).map_err(|message| {
        TrawlError::TokenParse {
            url: url.to_string(),
            message,
        }
    })?;

    Ok(token.to_string())
}

/// A token resolved for one query
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub query: String,
    pub token: String,

    /// When the token was scraped
    pub fetched_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(query: &str, token: &str) -> Self {
        Self {
            query: query.to_string(),
            token: token.to_string(),
            fetched_at: Utc::now(),
        }
    }

    /// Returns how long ago the token was scraped
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }

    /// Returns true once the token has outlived `ttl`
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}

/// Holds the session token of the current run
///
/// Scoped to a single orchestration run. A stale entry, or an entry for a
/// different query, is never handed out.
#[derive(Debug, Clone)]
pub struct TokenCache {
    ttl: Duration,
    entry: Option<CachedToken>,
}

impl TokenCache {
    /// Creates an empty cache whose tokens expire after `ttl_secs`
    pub fn new(ttl_secs: u64) -> Self {
        let secs = i64::try_from(ttl_secs)
            .unwrap_or(MAX_TOKEN_TTL_SECS)
            .min(MAX_TOKEN_TTL_SECS);
        Self {
            ttl: Duration::seconds(secs),
            entry: None,
        }
    }

    /// Returns the cached token for `query` if it is still fresh
    pub fn get(&self, query: &str) -> Option<&str> {
        self.entry
            .as_ref()
            .filter(|entry| entry.query == query && !entry.is_stale(self.ttl))
            .map(|entry| entry.token.as_str())
    }

    /// Replaces the cached token
    pub fn store(&mut self, query: &str, token: &str) {
        self.entry = Some(CachedToken::new(query, token));
    }

    /// Drops the cached token so the next lookup misses
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Returns the cached entry, fresh or not
    pub fn entry(&self) -> Option<&CachedToken> {
        self.entry.as_ref()
    }
}
