//! Configuration for the ORKG content API server.

use std::time::Duration;

/// Default configuration constants.
pub mod defaults {
    use std::time::Duration;

    /// Address the HTTP server binds to.
    pub const BIND_ADDRESS: &str = "0.0.0.0";

    /// Port the HTTP server listens on.
    pub const PORT: u16 = 8080;

    /// Default page size when none is requested.
    pub const PAGE_SIZE: usize = 25;

    /// Hard upper bound on requested page sizes.
    pub const MAX_PAGE_SIZE: usize = 2500;

    /// TTL for cached published literature list and smart review contents.
    pub const PUBLISHED_CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum number of cached published contents.
    pub const PUBLISHED_CACHE_MAX_SIZE: u64 = 1000;
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_address: String,

    /// Port the HTTP server listens on.
    pub port: u16,

    /// TTL for the published-contents cache.
    pub published_cache_ttl: Duration,

    /// Maximum number of entries in the published-contents cache.
    pub published_cache_max_size: u64,
}

impl Config {
    /// Create a configuration with the given listen port.
    #[must_use]
    pub fn new(port: u16) -> Self {
        Self {
            bind_address: defaults::BIND_ADDRESS.to_string(),
            port,
            published_cache_ttl: defaults::PUBLISHED_CACHE_TTL,
            published_cache_max_size: defaults::PUBLISHED_CACHE_MAX_SIZE,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if `ORKG_API_PORT` is set but not a valid port number.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("ORKG_API_PORT") {
            Ok(value) => value.parse()?,
            Err(_) => defaults::PORT,
        };
        Ok(Self::new(port))
    }

    /// Create a test configuration with caching disabled.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            published_cache_ttl: Duration::from_secs(0),
            published_cache_max_size: 0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(defaults::PORT)
    }
}
