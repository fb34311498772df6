//! Client configuration
//!
//! The base origin and request deadline come from the environment in
//! deployed builds (`MURMUR_API_URL`, `MURMUR_API_TIMEOUT_SECS`) and default
//! to the local development backend otherwise.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default API origin when the environment provides none
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default per-request deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while building a [`ClientConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL did not parse as an absolute URL
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The timeout is zero
    #[error("request timeout must be greater than zero")]
    InvalidTimeout,

    /// Failed to construct the underlying HTTP client
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Configuration for [`ApiClient`](crate::ApiClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base origin every request path is resolved against
    pub base_url: String,
    /// Per-request deadline applied when the descriptor sets none
    pub timeout: Duration,
    /// Log request and response bodies at debug level
    pub log_bodies: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            log_bodies: false,
        }
    }
}

impl ClientConfig {
    /// Create a configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Build a configuration from the process environment
    ///
    /// Reads `MURMUR_API_URL`, `MURMUR_API_TIMEOUT_SECS` and
    /// `MURMUR_DEBUG_HTTP`; anything unset keeps its default.
    ///
    /// # Errors
    /// Returns an error if a supplied value fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::builder();

        if let Ok(url) = std::env::var("MURMUR_API_URL") {
            builder = builder.base_url(url);
        }
        if let Ok(secs) = std::env::var("MURMUR_API_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout)?;
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if std::env::var("MURMUR_DEBUG_HTTP").map(|v| v == "1").unwrap_or(false) {
            builder = builder.log_bodies(true);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(())
    }

    /// Base URL with any trailing slash removed, ready for path joining
    pub(crate) fn base_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn log_bodies(mut self, enabled: bool) -> Self {
        self.config.log_bodies = enabled;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    /// Returns an error if the base URL is not absolute or the timeout is
    /// zero.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
