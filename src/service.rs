//! Cache Service
//!
//! A registry of named caches ("regions"). The first request for a region
//! creates its cache from the configuration registered under that name, or
//! from the service's default configuration renamed to the region. Later
//! requests return the same instance.
//!
//! # Example
//!
//! ```rust
//! use fifo_cache::config::{CacheServiceConfig, FifoCacheConfig};
//! use fifo_cache::service::CacheService;
//! use std::sync::Arc;
//!
//! let service: CacheService<String, String> = CacheService::new(
//!     CacheServiceConfig::new(FifoCacheConfig::new("default", 100))
//!         .with_region(FifoCacheConfig::new("sessions", 10_000)),
//! );
//!
//! let sessions = service.cache_instance("sessions").unwrap();
//! assert_eq!(sessions.max_size(), 10_000);
//!
//! let other = service.cache_instance("avatars").unwrap();
//! assert_eq!(other.name(), "avatars");
//! assert_eq!(other.max_size(), 100);
//!
//! assert!(Arc::ptr_eq(&sessions, &service.cache_instance("sessions").unwrap()));
//! assert!(service.cache_instance("").is_err());
//! ```

use crate::concurrent::ConcurrentFifoCache;
use crate::config::{CacheServiceConfig, FifoCacheConfig};
use crate::error::{CacheError, Result};
use crate::listener::LoggingListener;
use core::fmt;
use core::hash::Hash;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registry handing out one shared [`ConcurrentFifoCache`] per region name.
pub struct CacheService<K, V> {
    default_config: FifoCacheConfig,
    configs: RwLock<HashMap<String, FifoCacheConfig>>,
    caches: RwLock<HashMap<String, Arc<ConcurrentFifoCache<K, V>>>>,
}

impl<K, V> CacheService<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a service from a default configuration and per-region ones.
    ///
    /// Region configurations with an empty name are ignored.
    pub fn new(config: CacheServiceConfig) -> Self {
        let configs = config
            .regions
            .into_iter()
            .filter(|region| !region.name.is_empty())
            .map(|region| (region.name.clone(), region))
            .collect();
        Self {
            default_config: config.default,
            configs: RwLock::new(configs),
            caches: RwLock::new(HashMap::new()),
        }
    }

    /// Registers (or replaces) the configuration for the region named in
    /// `config`. Caches that already exist are not affected.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`](crate::CacheError::InvalidArgument)
    /// if the configuration has an empty name.
    pub fn add_config(&self, config: FifoCacheConfig) -> Result<()> {
        if config.name.is_empty() {
            return Err(CacheError::invalid_argument("cache configuration name must not be empty"));
        }
        self.configs.write().insert(config.name.clone(), config);
        Ok(())
    }

    /// Returns the cache for `region`, creating it on first use.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`](crate::CacheError::InvalidArgument)
    /// if `region` is empty.
    pub fn cache_instance(&self, region: &str) -> Result<Arc<ConcurrentFifoCache<K, V>>> {
        if region.is_empty() {
            return Err(CacheError::invalid_argument("region name must not be empty"));
        }
        if let Some(cache) = self.caches.read().get(region) {
            return Ok(Arc::clone(cache));
        }

        let mut caches = self.caches.write();
        if let Some(cache) = caches.get(region) {
            return Ok(Arc::clone(cache));
        }
        let cache = Arc::new(self.create_cache(region));
        caches.insert(region.to_string(), Arc::clone(&cache));
        Ok(cache)
    }

    /// Returns every cache created so far, in no particular order.
    pub fn all_cache_instances(&self) -> Vec<Arc<ConcurrentFifoCache<K, V>>> {
        self.caches.read().values().cloned().collect()
    }

    fn create_cache(&self, region: &str) -> ConcurrentFifoCache<K, V> {
        let config = match self.configs.read().get(region) {
            Some(config) => config.clone(),
            None => FifoCacheConfig {
                name: region.to_string(),
                ..self.default_config.clone()
            },
        };
        let log_enabled = config.log_enabled;
        let cache = ConcurrentFifoCache::init(config, None);
        if log_enabled {
            cache.add_cache_listener(Arc::new(LoggingListener));
        }
        debug!(
            region,
            max_size = cache.max_size(),
            live_time_millis = cache.live_time_millis(),
            log_enabled,
            "cache created"
        );
        cache
    }
}

impl<K, V> fmt::Debug for CacheService<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut regions: Vec<String> = self.caches.read().keys().cloned().collect();
        regions.sort();
        f.debug_struct("CacheService")
            .field("default_config", &self.default_config)
            .field("regions", &regions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CacheService<u32, u32> {
        CacheService::new(
            CacheServiceConfig::new(
                FifoCacheConfig::new("default", 5).with_live_time_millis(60_000),
            )
            .with_region(FifoCacheConfig::new("big", 500)),
        )
    }

    #[test]
    fn test_default_config_is_renamed() {
        let service = service();
        let cache = service.cache_instance("adhoc").unwrap();
        assert_eq!(cache.name(), "adhoc");
        assert_eq!(cache.max_size(), 5);
        assert_eq!(cache.live_time_millis(), 60_000);
    }

    #[test]
    fn test_region_config_is_used() {
        let service = service();
        let cache = service.cache_instance("big").unwrap();
        assert_eq!(cache.max_size(), 500);
        assert_eq!(cache.live_time_millis(), -1);
    }

    #[test]
    fn test_instances_are_shared() {
        let service = service();
        let first = service.cache_instance("a").unwrap();
        first.put(1, 10).unwrap();
        let second = service.cache_instance("a").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.get(&1).unwrap(), Some(10));
        assert_eq!(service.all_cache_instances().len(), 1);
    }

    #[test]
    fn test_empty_region_rejected() {
        let service = service();
        assert!(matches!(
            service.cache_instance(""),
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(service.all_cache_instances().is_empty());
    }

    #[test]
    fn test_add_config() {
        let service = service();
        assert!(matches!(
            service.add_config(FifoCacheConfig::new("", 1)),
            Err(CacheError::InvalidArgument(_))
        ));
        service
            .add_config(FifoCacheConfig::new("late", 42).with_log_enabled(true))
            .unwrap();
        let cache = service.cache_instance("late").unwrap();
        assert_eq!(cache.max_size(), 42);
        assert!(cache.is_log_enabled());
        cache.put(1, 1).unwrap();
        assert_eq!(cache.get(&1).unwrap(), Some(1));
    }
}
