//! Configuration for the concurrent FIFO cache.
//!
//! # Sizing and Expiration
//!
//! - **`max_size`**: Number of entries the cache aims to hold. The bound is
//!   soft: under concurrent writes the cache may briefly exceed it while one
//!   thread trims on behalf of everyone.
//! - **`live_time_millis`**: Time to live of each entry, counted from the
//!   write that stored it. `-1` (or any negative value) means entries never
//!   expire; `0` disables caching entirely (writes are dropped).
//!
//! # Examples
//!
//! ```
//! use fifo_cache::config::FifoCacheConfig;
//! use fifo_cache::ConcurrentFifoCache;
//!
//! let config = FifoCacheConfig {
//!     name: "user-profiles".to_string(),
//!     label: None,
//!     max_size: 1_000,
//!     live_time_millis: 30_000,
//!     log_enabled: false,
//! };
//! let cache: ConcurrentFifoCache<String, Vec<u8>> = ConcurrentFifoCache::init(config, None);
//! assert_eq!(cache.max_size(), 1_000);
//! ```

use core::fmt;

/// Bound used when none is configured.
pub const DEFAULT_MAX_SIZE: usize = 50;

/// Live time meaning "never expires".
pub const NEVER_EXPIRES: i64 = -1;

/// Live time meaning "do not cache".
pub const CACHING_DISABLED: i64 = 0;

/// Configuration for a [`ConcurrentFifoCache`](crate::ConcurrentFifoCache).
///
/// # Fields
///
/// - `name`: Cache name, reported to listeners and in logs.
/// - `label`: Short display name. When `None`, long dotted names are
///   shortened to their last segment.
/// - `max_size`: Soft bound on the number of entries.
/// - `live_time_millis`: Time to live; negative never expires, `0` disables.
/// - `log_enabled`: Whether the cache service attaches a logging listener.
#[derive(Clone, PartialEq, Eq)]
pub struct FifoCacheConfig {
    /// Cache name.
    pub name: String,
    /// Optional short display name.
    pub label: Option<String>,
    /// Soft bound on the number of entries.
    pub max_size: usize,
    /// Time to live in milliseconds.
    pub live_time_millis: i64,
    /// Whether writes and evictions are logged through a listener.
    pub log_enabled: bool,
}

impl FifoCacheConfig {
    /// Creates a configuration with the given name and bound; entries never expire.
    #[must_use]
    pub fn new(name: impl Into<String>, max_size: usize) -> Self {
        Self {
            name: name.into(),
            max_size,
            ..Self::default()
        }
    }

    /// Sets the time to live in milliseconds.
    #[must_use]
    pub fn with_live_time_millis(mut self, live_time_millis: i64) -> Self {
        self.live_time_millis = live_time_millis;
        self
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Enables or disables the logging listener.
    #[must_use]
    pub fn with_log_enabled(mut self, log_enabled: bool) -> Self {
        self.log_enabled = log_enabled;
        self
    }
}

impl Default for FifoCacheConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            label: None,
            max_size: DEFAULT_MAX_SIZE,
            live_time_millis: NEVER_EXPIRES,
            log_enabled: false,
        }
    }
}

impl fmt::Debug for FifoCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FifoCacheConfig")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("max_size", &self.max_size)
            .field("live_time_millis", &self.live_time_millis)
            .field("log_enabled", &self.log_enabled)
            .finish()
    }
}
