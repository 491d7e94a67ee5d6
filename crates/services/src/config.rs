use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid api url {raw:?}: {source}")]
    InvalidUrl {
        raw: String,
        source: url::ParseError,
    },
    #[error("api url must use http or https: {0}")]
    UnsupportedScheme(String),
    #[error("request timeout must be positive")]
    ZeroTimeout,
}

/// Where the backend lives and how long a single request may take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: Url,
    pub request_timeout: Duration,
}

impl BackendConfig {
    /// Build a config, normalizing the base URL to end with `/` so relative
    /// endpoint paths join beneath it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unparsable or non-HTTP URLs and zero timeouts.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim();
        let mut url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidUrl {
            raw: trimmed.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(trimmed.to_string()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        if request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self {
            base_url: url,
            request_timeout,
        })
    }
}
