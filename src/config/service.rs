//! Configuration for the cache service.
//!
//! The service creates caches on demand by region name. A region with its
//! own [`FifoCacheConfig`] uses it; any other region falls back to the
//! default configuration, with the region name substituted.
//!
//! # Examples
//!
//! ```
//! use fifo_cache::config::{CacheServiceConfig, FifoCacheConfig};
//!
//! let config = CacheServiceConfig::new(FifoCacheConfig::new("default", 100))
//!     .with_region(FifoCacheConfig::new("users", 5_000).with_live_time_millis(60_000));
//! assert_eq!(config.regions.len(), 1);
//! ```

use super::FifoCacheConfig;
use core::fmt;

/// Configuration for a [`CacheService`](crate::service::CacheService).
#[derive(Clone, Default)]
pub struct CacheServiceConfig {
    /// Configuration used for regions without their own entry.
    pub default: FifoCacheConfig,
    /// Per-region configurations, keyed by their `name`.
    pub regions: Vec<FifoCacheConfig>,
}

impl CacheServiceConfig {
    /// Creates a service configuration with the given default.
    #[must_use]
    pub fn new(default: FifoCacheConfig) -> Self {
        Self {
            default,
            regions: Vec::new(),
        }
    }

    /// Adds a region configuration.
    #[must_use]
    pub fn with_region(mut self, region: FifoCacheConfig) -> Self {
        self.regions.push(region);
        self
    }
}

impl fmt::Debug for CacheServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheServiceConfig")
            .field("default", &self.default)
            .field("regions", &self.regions.len())
            .finish()
    }
}
