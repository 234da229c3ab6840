//! Cache Metrics System
//!
//! Counters are kept as relaxed atomics while the cache runs and turned into
//! a plain snapshot on demand. Snapshots implement [`CacheMetrics`], which
//! reports everything as a `BTreeMap` so output always comes out in the same
//! order.
//!
//! The counters are approximate under contention: increments from
//! concurrent operations are not ordered with respect to each other or to
//! the moment a snapshot is taken. They are fit for monitoring, not for
//! decisions that need exact numbers.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub mod fifo;

pub use fifo::FifoCacheMetrics;

/// Common metrics tracked by the cache.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CoreCacheMetrics {
    /// Total number of lookups.
    pub requests: u64,

    /// Lookups that returned a valid value.
    pub cache_hits: u64,

    /// Lookups that found nothing or an expired value.
    pub cache_misses: u64,

    /// Values written.
    pub puts: u64,

    /// Entries evicted to respect the size bound.
    pub evictions: u64,

    /// Expired entries dropped by a read or an explicit remove. Entries the
    /// size bound pushed out are counted as evictions instead.
    pub expirations: u64,

    /// Entries removed explicitly while still valid.
    pub removals: u64,

    /// Number of entries at snapshot time.
    pub cache_size: u64,

    /// Configured bound at snapshot time.
    pub max_cache_size: u64,
}

impl CoreCacheMetrics {
    /// Calculates the cache hit rate
    ///
    /// # Returns
    /// A value between 0.0 and 1.0, or 0.0 if no requests have been made
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Calculates the cache miss rate
    ///
    /// # Returns
    /// A value between 0.0 and 1.0, or 0.0 if no requests have been made
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_misses as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Calculates how full the cache is relative to its bound.
    ///
    /// May exceed 1.0 briefly since the bound is soft.
    pub fn cache_utilization(&self) -> f64 {
        if self.max_cache_size > 0 {
            self.cache_size as f64 / self.max_cache_size as f64
        } else {
            0.0
        }
    }

    /// Convert core metrics to BTreeMap for reporting
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert("cache_misses".to_string(), self.cache_misses as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("expirations".to_string(), self.expirations as f64);
        metrics.insert("puts".to_string(), self.puts as f64);
        metrics.insert("removals".to_string(), self.removals as f64);
        metrics.insert("requests".to_string(), self.requests as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        metrics.insert("cache_size".to_string(), self.cache_size as f64);
        metrics.insert("max_cache_size".to_string(), self.max_cache_size as f64);
        metrics.insert("cache_utilization".to_string(), self.cache_utilization());

        if self.puts > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.puts as f64,
            );
        }

        metrics
    }
}

/// Live counters updated by cache operations.
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    puts: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    removals: AtomicU64,
    skipped_trims: AtomicU64,
}

impl CacheCounters {
    #[inline]
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_put(&self) {
        self.puts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_evictions(&self, count: usize) {
        if count > 0 {
            self.evictions.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_skipped_trim(&self) {
        self.skipped_trims.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub(crate) fn snapshot(&self, cache_size: usize, max_cache_size: usize) -> FifoCacheMetrics {
        let cache_hits = self.hits();
        let cache_misses = self.misses();
        FifoCacheMetrics {
            core: CoreCacheMetrics {
                requests: cache_hits + cache_misses,
                cache_hits,
                cache_misses,
                puts: self.puts.load(Ordering::Relaxed),
                evictions: self.evictions.load(Ordering::Relaxed),
                expirations: self.expirations.load(Ordering::Relaxed),
                removals: self.removals.load(Ordering::Relaxed),
                cache_size: cache_size as u64,
                max_cache_size: max_cache_size as u64,
            },
            skipped_trims: self.skipped_trims.load(Ordering::Relaxed),
        }
    }
}

/// Uniform interface for retrieving metrics from a cache.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Algorithm name for identification
    fn algorithm_name(&self) -> &'static str;
}
