use crate::config::types::{ClientConfig, Config, DownloadConfig, ProviderConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_provider_config(&config.provider)?;
    validate_client_config(&config.client)?;
    validate_download_config(&config.download)?;
    Ok(())
}

/// Validates provider configuration
fn validate_provider_config(config: &ProviderConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            config.base_url
        )));
    }

    if config.locale.trim().is_empty() {
        return Err(ConfigError::Validation("locale cannot be empty".to_string()));
    }

    if config.token_marker.is_empty() {
        return Err(ConfigError::Validation(
            "token_marker cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates download loop configuration
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            config.page_size
        )));
    }

    if config.cache_token && config.token_ttl_secs < 1 {
        return Err(ConfigError::Validation(
            "token_ttl_secs must be >= 1 when cache_token is enabled".to_string(),
        ));
    }

    if let Some(root) = &config.output_root {
        if root.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output_root cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
