//! Cache configuration

use std::time::Duration;

/// Configuration for [`Cache`](super::Cache)
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied by `insert` when no per-entry TTL is given
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        // Matches the service layer's five-minute response cache window.
        Self { default_ttl: Duration::from_secs(300) }
    }
}

impl CacheConfig {
    /// Create a configuration with the given default TTL
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self { default_ttl }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache configuration.
    use super::*;

    /// Validates the default TTL is five minutes.
    #[test]
    fn test_default_ttl() {
        assert_eq!(CacheConfig::default().default_ttl, Duration::from_secs(300));
    }

    /// Validates `with_default_ttl` overrides the window.
    #[test]
    fn test_with_default_ttl() {
        let config = CacheConfig::with_default_ttl(Duration::from_secs(30));
        assert_eq!(config.default_ttl, Duration::from_secs(30));
    }
}
