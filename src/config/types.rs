use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Image-Trawl
///
/// Every section is optional; missing keys fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Search provider endpoints and fixed query parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Scheme and host the token page and results endpoint live under
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Value of the `l` query parameter
    pub locale: String,

    /// Value of the `f` query parameter
    pub filter: String,

    /// Text preceding the quoted session token in the search page
    #[serde(rename = "token-marker")]
    pub token_marker: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://duckduckgo.com".to_string(),
            locale: "us-en".to_string(),
            filter: ",,,".to_string(),
            token_marker: "vqd=".to_string(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Overall request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// TCP connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("image-trawl/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Download loop configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Offset stride between result pages
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Consecutive pages without a new download before giving up (0 = never)
    #[serde(rename = "max-stalled-pages")]
    pub max_stalled_pages: u32,

    /// Directory the query directory is created in (defaults to the working directory)
    #[serde(rename = "output-root")]
    pub output_root: Option<PathBuf>,

    /// Reuse the session token across pages of one run
    #[serde(rename = "cache-token")]
    pub cache_token: bool,

    /// Lifetime of a cached session token (seconds)
    #[serde(rename = "token-ttl-secs")]
    pub token_ttl_secs: u64,

    /// Write through a `.part` file and rename into place
    #[serde(rename = "atomic-writes")]
    pub atomic_writes: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_stalled_pages: 5,
            output_root: None,
            cache_token: true,
            token_ttl_secs: 600,
            atomic_writes: false,
        }
    }
}
