//! Cache Configuration Module
//!
//! Configuration structures for the FIFO cache and the cache service.
//!
//! # Design Philosophy
//!
//! Configuration structs have all public fields for simple instantiation:
//!
//! - **Simple**: Just create the struct with all fields set
//! - **Defaults**: `Default` gives a 50-entry cache whose entries never expire
//! - **Builders**: `with_*` methods for the common tweaks
//!
//! | Config | Used by | Description |
//! |--------|---------|-------------|
//! | `FifoCacheConfig` | [`ConcurrentFifoCache`](crate::ConcurrentFifoCache) | Bound, TTL, naming, logging |
//! | `CacheServiceConfig` | [`CacheService`](crate::service::CacheService) | Default and per-region configs |
//!
//! # Examples
//!
//! ```
//! use fifo_cache::config::FifoCacheConfig;
//! use fifo_cache::ConcurrentFifoCache;
//!
//! let config = FifoCacheConfig::new("thumbnails", 1000).with_live_time_millis(60_000);
//! let cache: ConcurrentFifoCache<String, Vec<u8>> = ConcurrentFifoCache::init(config, None);
//! assert_eq!(cache.name(), "thumbnails");
//! ```

pub mod fifo;
pub mod service;

pub use fifo::{FifoCacheConfig, CACHING_DISABLED, DEFAULT_MAX_SIZE, NEVER_EXPIRES};
pub use service::CacheServiceConfig;
