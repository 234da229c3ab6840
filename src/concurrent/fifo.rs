//! Concurrent FIFO Cache Implementation
//!
//! A thread-safe, bounded cache that evicts in insertion order and expires
//! entries after a configurable time to live.
//!
//! # How It Works
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                      ConcurrentFifoCache                             │
//! │                                                                      │
//! │  settings, counters, listeners (shared across clears)                │
//! │                                                                      │
//! │  ArcSwap ──▶ CacheState                                              │
//! │              ┌──────────────────────┐  ┌──────────────────────────┐  │
//! │              │ LookupIndex          │  │ Queue                    │  │
//! │              │ papaya::HashMap      │  │ Mutex<arena list>        │  │
//! │              │ lock-free get        │  │ AtomicBool trim gate     │  │
//! │              └──────────────────────┘  └──────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - Reads go to the lookup index only and never lock.
//! - Writes bind the key in the index, then link the new entry at the head
//!   of the queue and trim the tail down to `max_size`.
//! - Rewriting a key moves it to the newest position. Reads never reorder:
//!   this is FIFO, not LRU.
//! - `clear_cache` swaps in a fresh index/queue pair. Operations still
//!   running against the old pair finish there and their effects are lost.
//!
//! ## Soft Bound
//!
//! Only one thread trims at a time. A writer that finds a trim in progress
//! does not wait for it, so the cache can hold a few more than `max_size`
//! entries until the next write trims again.
//!
//! ## Listener Errors
//!
//! Listener callbacks run on the calling thread after the operation has been
//! applied. An error from a listener is returned to the caller of the
//! operation that triggered it. See [`crate::listener`].
//!
//! # Example
//!
//! ```rust
//! use fifo_cache::ConcurrentFifoCache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache: Arc<ConcurrentFifoCache<String, usize>> = Arc::new(ConcurrentFifoCache::new(10_000));
//!
//! let handles: Vec<_> = (0..4).map(|i| {
//!     let cache = Arc::clone(&cache);
//!     thread::spawn(move || {
//!         for j in 0..1000 {
//!             cache.put(format!("key-{}-{}", i, j), j).unwrap();
//!         }
//!     })
//! }).collect();
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//!
//! assert_eq!(cache.size(), 4000);
//! ```

use crate::config::{FifoCacheConfig, CACHING_DISABLED};
use crate::entry::CacheEntry;
use crate::error::{CacheError, ConsistencyError, Result};
use crate::listener::{CacheEvent, CacheInfo, CacheListener};
use crate::metrics::FifoCacheMetrics;
use crate::state::{clamp_live_time, CacheShared, CacheState, ListenerContext};
use crate::time::{Clock, SystemClock};
use arc_swap::ArcSwap;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// Names longer than this get a shortened default label.
const LABEL_MAX_LEN: usize = 30;

/// A thread-safe FIFO cache with TTL expiration.
///
/// # Type Parameters
///
/// - `K`: Key type. Must implement `Hash + Eq + Clone + Send + Sync`.
/// - `V`: Value type. Must implement `Clone + Send + Sync`.
/// - `S`: Hash builder type. Defaults to `DefaultHashBuilder`.
///
/// # Example
///
/// ```rust
/// use fifo_cache::ConcurrentFifoCache;
///
/// let cache = ConcurrentFifoCache::new(2);
/// cache.put("a", 1).unwrap();
/// cache.put("b", 2).unwrap();
/// cache.put("c", 3).unwrap();
///
/// // "a" was inserted first, so it went first.
/// assert_eq!(cache.get("a").unwrap(), None);
/// assert_eq!(cache.get("c").unwrap(), Some(3));
/// ```
pub struct ConcurrentFifoCache<K, V, S = DefaultHashBuilder> {
    shared: CacheShared<K, V>,
    state: ArcSwap<CacheState<K, V, S>>,
    hash_builder: S,
}

impl<K, V> ConcurrentFifoCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Creates a cache holding about `max_size` entries that never expire.
    pub fn new(max_size: usize) -> Self {
        Self::init(
            FifoCacheConfig {
                max_size,
                ..FifoCacheConfig::default()
            },
            None,
        )
    }

    /// Creates a new concurrent FIFO cache from a configuration with an optional hasher.
    ///
    /// This is the **recommended** way to create a cache.
    ///
    /// # Arguments
    ///
    /// * `config` - Bound, time to live, naming and logging settings
    /// * `hasher` - Optional custom hash builder. If `None`, uses `DefaultHashBuilder`
    pub fn init(config: FifoCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::init_with_hasher(config, hasher.unwrap_or_default())
    }
}

impl<K, V, S> ConcurrentFifoCache<K, V, S>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
    S: BuildHasher + Clone,
{
    /// Creates a cache with a custom hash builder.
    ///
    /// # Arguments
    ///
    /// * `config` - Bound, time to live, naming and logging settings
    /// * `hash_builder` - Hash builder, cloned for every fresh index
    pub fn init_with_hasher(config: FifoCacheConfig, hash_builder: S) -> Self {
        let shared = CacheShared::new(
            config.name,
            config.label,
            config.max_size,
            config.live_time_millis,
            config.log_enabled,
            Arc::new(SystemClock),
        );
        Self {
            shared,
            state: ArcSwap::from_pointee(CacheState::new(hash_builder.clone())),
            hash_builder,
        }
    }

    /// Replaces the time source used for expiration.
    ///
    /// Meant to be called right after construction; entries already stored
    /// keep the expiration times computed with the previous clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.shared.clock = clock;
        self
    }

    /// Returns the cache name.
    pub fn name(&self) -> String {
        self.shared.name.read().clone()
    }

    /// Sets the cache name.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.shared.name.write() = name.into();
    }

    /// Returns the display label.
    ///
    /// Without an explicit label, names longer than 30 characters are
    /// shortened to the part after their last `.` and that becomes the label.
    pub fn label(&self) -> String {
        if let Some(label) = self.shared.label.read().as_ref() {
            return label.clone();
        }
        let name = self.name();
        if name.chars().count() > LABEL_MAX_LEN {
            let short = match name.rfind('.') {
                Some(dot) => name[dot + 1..].to_string(),
                None => name,
            };
            self.set_label(short.clone());
            return short;
        }
        name
    }

    /// Sets the display label.
    pub fn set_label(&self, label: impl Into<String>) {
        *self.shared.label.write() = Some(label.into());
    }

    /// Returns the configured bound.
    pub fn max_size(&self) -> usize {
        self.shared.max_size()
    }

    /// Sets the bound. Takes effect on the next write.
    pub fn set_max_size(&self, max_size: usize) {
        self.shared.max_size.store(max_size, Ordering::Release);
    }

    /// Returns the time to live in milliseconds (`-1` never, `0` disabled).
    pub fn live_time_millis(&self) -> i64 {
        self.shared.live_time_millis()
    }

    /// Sets the time to live in milliseconds for future writes.
    ///
    /// Negative values mean entries never expire; `0` disables caching.
    pub fn set_live_time_millis(&self, live_time_millis: i64) {
        self.shared
            .live_time_millis
            .store(clamp_live_time(live_time_millis), Ordering::Release);
    }

    /// Returns the time to live in seconds, `-1` if entries never expire.
    pub fn live_time(&self) -> i64 {
        match self.live_time_millis() {
            -1 => -1,
            millis => millis / 1000,
        }
    }

    /// Sets the time to live in seconds.
    pub fn set_live_time(&self, seconds: i64) {
        self.set_live_time_millis(seconds.saturating_mul(1000));
    }

    /// Returns whether logging was requested for this cache.
    pub fn is_log_enabled(&self) -> bool {
        self.shared.log_enabled.load(Ordering::Relaxed)
    }

    /// Records whether logging is requested for this cache.
    ///
    /// The flag itself does not attach anything; the cache service adds a
    /// [`LoggingListener`](crate::listener::LoggingListener) when it is set.
    pub fn set_log_enabled(&self, log_enabled: bool) {
        self.shared.log_enabled.store(log_enabled, Ordering::Relaxed);
    }

    /// Retrieves a value from the cache.
    ///
    /// Returns a **clone** of the value. An expired entry is dropped and
    /// reported to listeners as expired; the call then returns `None`.
    pub fn get<Q>(&self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.state.load().get(&self.shared, key)
    }

    /// Stores `value` under `key` as the newest entry.
    ///
    /// If the key was already present its old entry is dropped and the key
    /// moves to the newest position. Does nothing while caching is disabled
    /// (`live_time_millis == 0`).
    pub fn put(&self, key: K, value: V) -> Result<()> {
        if self.live_time_millis() == CACHING_DISABLED {
            return Ok(());
        }
        let expires_at = self.shared.expiration_for_write();
        self.state.load().put(&self.shared, expires_at, key, value)
    }

    /// Stores every pair from `entries`, all with the same expiration time.
    ///
    /// Stops at the first listener error; pairs before it stay stored.
    pub fn put_all<I>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        if self.live_time_millis() == CACHING_DISABLED {
            return Ok(());
        }
        let expires_at = self.shared.expiration_for_write();
        let state = self.state.load();
        for (key, value) in entries {
            state.put(&self.shared, expires_at, key, value)?;
        }
        Ok(())
    }

    /// Removes `key`, returning its value if the entry was still valid.
    ///
    /// An entry that had already expired (or was concurrently evicted) is
    /// reported to listeners as expired and `None` is returned.
    pub fn remove<Q>(&self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.state.load().remove(&self.shared, key)
    }

    /// Returns the values that are currently valid.
    pub fn cached_objects(&self) -> Vec<V> {
        let now = self.shared.now_millis();
        self.state
            .load()
            .valid_entries(now)
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns the values that are currently valid, then clears the cache.
    pub fn remove_cached_objects(&self) -> Result<Vec<V>> {
        let objects = self.cached_objects();
        self.clear_cache()?;
        Ok(objects)
    }

    /// Discards every entry by swapping in an empty index/queue pair.
    pub fn clear_cache(&self) -> Result<()> {
        let fresh = Arc::new(CacheState::new(self.hash_builder.clone()));
        let old = self.state.swap(Arc::clone(&fresh));
        debug!(
            cache = %self.name(),
            discarded = old.queue.len(),
            "cache cleared"
        );
        let ctx = ListenerContext {
            shared: &self.shared,
            state: fresh.as_ref(),
        };
        self.shared
            .notify(CacheEvent::ClearCache, |l| l.on_clear_cache(&ctx))
    }

    /// Visits a snapshot of the cached entries.
    ///
    /// `on_select` is called for every entry accepted by `predicate`. The
    /// snapshot is taken up front, so `on_select` may call back into the
    /// cache (for instance to remove the entry). The first error returned by
    /// `on_select` stops the walk and is returned as [`CacheError::Selector`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use fifo_cache::ConcurrentFifoCache;
    ///
    /// let cache = ConcurrentFifoCache::new(10);
    /// for i in 0..6 {
    ///     cache.put(i, i * 10).unwrap();
    /// }
    /// cache
    ///     .select(
    ///         |key, _| key % 2 == 0,
    ///         |cache, entry| {
    ///             cache.remove(entry.key())?;
    ///             Ok(())
    ///         },
    ///     )
    ///     .unwrap();
    /// assert_eq!(cache.size(), 3);
    /// ```
    pub fn select<P, F>(&self, mut predicate: P, mut on_select: F) -> Result<()>
    where
        P: FnMut(&K, &CacheEntry<K, V>) -> bool,
        F: FnMut(&Self, &CacheEntry<K, V>) -> core::result::Result<(), crate::error::BoxError>,
    {
        let snapshot = self.state.load().index.snapshot();
        for entry in &snapshot {
            if predicate(entry.key(), entry) {
                on_select(self, entry).map_err(CacheError::Selector)?;
            }
        }
        Ok(())
    }

    /// Returns the number of entries (approximate while writes are in flight).
    pub fn size(&self) -> usize {
        self.state.load().queue.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns the number of lookups that found a valid value.
    pub fn hits(&self) -> u64 {
        self.shared.counters.hits()
    }

    /// Returns the number of lookups that found nothing or an expired value.
    pub fn misses(&self) -> u64 {
        self.shared.counters.misses()
    }

    /// Registers a listener. Operations already running may or may not see it.
    pub fn add_cache_listener(&self, listener: Arc<dyn CacheListener<K, V>>) {
        self.shared.listeners.rcu(|current| {
            let mut next: Vec<_> = current.iter().cloned().collect();
            next.push(Arc::clone(&listener));
            next
        });
    }

    /// Returns a snapshot of the cache's counters.
    pub fn metrics(&self) -> FifoCacheMetrics {
        self.shared.counters.snapshot(self.size(), self.max_size())
    }

    /// Checks that the queue's bookkeeping holds and that index and queue
    /// agree. Only meaningful while no operation is in flight.
    pub fn assert_consistent(&self) -> core::result::Result<(), ConsistencyError> {
        self.state.load().assert_consistency()
    }
}

impl<K, V, S> CacheInfo for ConcurrentFifoCache<K, V, S>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
    S: BuildHasher + Clone,
{
    fn name(&self) -> String {
        ConcurrentFifoCache::name(self)
    }

    fn max_size(&self) -> usize {
        ConcurrentFifoCache::max_size(self)
    }

    fn live_time_millis(&self) -> i64 {
        ConcurrentFifoCache::live_time_millis(self)
    }

    fn size(&self) -> usize {
        ConcurrentFifoCache::size(self)
    }
}

impl<K, V, S> fmt::Debug for ConcurrentFifoCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentFifoCache")
            .field("name", &*self.shared.name.read())
            .field("max_size", &self.shared.max_size())
            .field("live_time_millis", &self.shared.live_time_millis())
            .field("size", &self.state.load().queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;

    #[test]
    fn test_new_defaults() {
        let cache: ConcurrentFifoCache<u32, u32> = ConcurrentFifoCache::new(8);
        assert_eq!(cache.max_size(), 8);
        assert_eq!(cache.live_time_millis(), -1);
        assert_eq!(cache.live_time(), -1);
        assert!(cache.is_empty());
        assert!(!cache.is_log_enabled());
    }

    #[test]
    fn test_live_time_setters() {
        let cache: ConcurrentFifoCache<u32, u32> = ConcurrentFifoCache::new(8);
        cache.set_live_time_millis(-42);
        assert_eq!(cache.live_time_millis(), -1);
        cache.set_live_time(3);
        assert_eq!(cache.live_time_millis(), 3_000);
        assert_eq!(cache.live_time(), 3);
        cache.set_live_time_millis(1_500);
        assert_eq!(cache.live_time(), 1);
    }

    #[test]
    fn test_label_shortens_long_dotted_names() {
        let cache: ConcurrentFifoCache<u32, u32> = ConcurrentFifoCache::init(
            FifoCacheConfig::new("org.example.social.storage.ActivitiesCache", 8),
            None,
        );
        assert_eq!(cache.label(), "ActivitiesCache");

        cache.set_name("short");
        // The derived label was stored and sticks.
        assert_eq!(cache.label(), "ActivitiesCache");
        cache.set_label("explicit");
        assert_eq!(cache.label(), "explicit");
    }

    #[test]
    fn test_label_defaults_to_short_name() {
        let cache: ConcurrentFifoCache<u32, u32> =
            ConcurrentFifoCache::init(FifoCacheConfig::new("users", 8), None);
        assert_eq!(cache.label(), "users");
    }

    #[test]
    fn test_disabled_cache_drops_writes() {
        let cache = ConcurrentFifoCache::new(8);
        cache.set_live_time_millis(0);
        cache.put(1, 1).unwrap();
        cache.put_all(vec![(2, 2), (3, 3)]).unwrap();
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.get(&1).unwrap(), None);
    }

    #[test]
    fn test_put_all_shares_expiration() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = ConcurrentFifoCache::init(
            FifoCacheConfig::new("batch", 8).with_live_time_millis(100),
            None,
        )
        .with_clock(clock.clone());

        cache.put_all(vec![(1, "a"), (2, "b")]).unwrap();
        clock.advance(99);
        assert_eq!(cache.cached_objects().len(), 2);
        clock.advance(1);
        assert!(cache.cached_objects().is_empty());
    }

    #[test]
    fn test_clear_cache_swaps_state() {
        let cache = ConcurrentFifoCache::new(8);
        cache.put("a", 1).unwrap();
        cache.put("b", 2).unwrap();
        cache.clear_cache().unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a").unwrap(), None);
        assert!(cache.assert_consistent().is_ok());
        cache.put("c", 3).unwrap();
        assert_eq!(cache.get("c").unwrap(), Some(3));
    }

    #[test]
    fn test_remove_cached_objects() {
        let cache = ConcurrentFifoCache::new(8);
        cache.put("a", 1).unwrap();
        cache.put("b", 2).unwrap();
        let mut objects = cache.remove_cached_objects().unwrap();
        objects.sort_unstable();
        assert_eq!(objects, vec![1, 2]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_select_error_propagates() {
        let cache = ConcurrentFifoCache::new(8);
        cache.put("a", 1).unwrap();
        let result = cache.select(|_, _| true, |_, _| Err("nope".into()));
        assert!(matches!(result, Err(CacheError::Selector(_))));
    }

    #[test]
    fn test_select_skips_rejected_entries() {
        let cache = ConcurrentFifoCache::new(8);
        cache.put("a", 1).unwrap();
        cache.put("b", 2).unwrap();
        let mut seen = Vec::new();
        cache
            .select(
                |key, _| *key == "b",
                |_, entry| {
                    seen.push(*entry.value());
                    Ok(())
                },
            )
            .unwrap();
        assert_eq!(seen, vec![2]);
    }

    #[test]
    fn test_metrics_snapshot() {
        let cache = ConcurrentFifoCache::new(1);
        cache.put("a", 1).unwrap();
        cache.put("b", 2).unwrap();
        assert_eq!(cache.get("b").unwrap(), Some(2));
        assert_eq!(cache.get("a").unwrap(), None);

        let metrics = cache.metrics();
        assert_eq!(metrics.core.puts, 2);
        assert_eq!(metrics.core.evictions, 1);
        assert_eq!(metrics.core.cache_hits, 1);
        assert_eq!(metrics.core.cache_misses, 1);
        assert_eq!(metrics.core.cache_size, 1);
        assert_eq!(metrics.core.max_cache_size, 1);
    }

    #[test]
    fn test_cache_info_view() {
        let cache: ConcurrentFifoCache<u32, u32> =
            ConcurrentFifoCache::init(FifoCacheConfig::new("info", 4), None);
        cache.put(1, 1).unwrap();
        let info: &dyn CacheInfo = &cache;
        assert_eq!(info.name(), "info");
        assert_eq!(info.max_size(), 4);
        assert_eq!(info.size(), 1);
    }
}
