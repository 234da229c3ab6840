//! Cache Listeners
//!
//! Listeners observe what happens to a cache: writes, hits, explicit
//! removals, expirations/evictions and clears. They are invoked synchronously
//! on the thread performing the operation, after the operation has been
//! applied, and never while the ordering queue's lock is held.
//!
//! # Failure Propagation
//!
//! A listener that returns an error fails the operation that triggered it:
//! the error reaches the caller as [`CacheError::Listener`]. The cache state
//! change has already happened at that point. Listeners registered after the
//! failing one are not called for that event. A single misbehaving listener
//! can therefore make otherwise-successful `put`/`get`/`remove` calls
//! report an error.
//!
//! [`CacheError::Listener`]: crate::error::CacheError::Listener

use crate::error::BoxError;
use core::fmt;
use tracing::{debug, info};

/// Result type returned by listener hooks.
pub type ListenerResult = Result<(), BoxError>;

/// Names a listener hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheEvent {
    /// A value was stored.
    Put,
    /// A valid value was read.
    Get,
    /// A value was removed explicitly.
    Remove,
    /// A value expired or was evicted for capacity.
    Expire,
    /// The cache was cleared.
    ClearCache,
}

impl fmt::Display for CacheEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheEvent::Put => write!(f, "put"),
            CacheEvent::Get => write!(f, "get"),
            CacheEvent::Remove => write!(f, "remove"),
            CacheEvent::Expire => write!(f, "expire"),
            CacheEvent::ClearCache => write!(f, "clear"),
        }
    }
}

/// Read-only view of the cache a listener is attached to.
pub trait CacheInfo {
    /// The cache name.
    fn name(&self) -> String;
    /// The configured bound.
    fn max_size(&self) -> usize;
    /// The time to live in milliseconds (`-1` never expires, `0` disabled).
    fn live_time_millis(&self) -> i64;
    /// The current (approximate) number of entries.
    fn size(&self) -> usize;
}

/// Receives notifications from a cache.
///
/// Every hook has a no-op default so implementors only override what they
/// need.
///
/// # Example
///
/// ```
/// use fifo_cache::listener::{CacheInfo, CacheListener, ListenerResult};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct ExpireCounter(AtomicUsize);
///
/// impl CacheListener<String, u32> for ExpireCounter {
///     fn on_expire(&self, _: &dyn CacheInfo, _: &String, _: &u32) -> ListenerResult {
///         self.0.fetch_add(1, Ordering::Relaxed);
///         Ok(())
///     }
/// }
/// ```
pub trait CacheListener<K, V>: Send + Sync {
    /// Called after `key` was bound to `value`.
    fn on_put(&self, cache: &dyn CacheInfo, key: &K, value: &V) -> ListenerResult {
        let _ = (cache, key, value);
        Ok(())
    }

    /// Called after a valid `value` was returned for `key`.
    fn on_get(&self, cache: &dyn CacheInfo, key: &K, value: &V) -> ListenerResult {
        let _ = (cache, key, value);
        Ok(())
    }

    /// Called after `key` was removed explicitly while still valid.
    fn on_remove(&self, cache: &dyn CacheInfo, key: &K, value: &V) -> ListenerResult {
        let _ = (cache, key, value);
        Ok(())
    }

    /// Called when `key` expired or was evicted to respect the size bound.
    fn on_expire(&self, cache: &dyn CacheInfo, key: &K, value: &V) -> ListenerResult {
        let _ = (cache, key, value);
        Ok(())
    }

    /// Called after the cache was cleared.
    fn on_clear_cache(&self, cache: &dyn CacheInfo) -> ListenerResult {
        let _ = cache;
        Ok(())
    }
}

/// Emits a `tracing` event for every notification.
///
/// Attached by the cache service to caches configured with
/// `log_enabled = true`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl<K: fmt::Debug, V> CacheListener<K, V> for LoggingListener {
    fn on_put(&self, cache: &dyn CacheInfo, key: &K, _value: &V) -> ListenerResult {
        debug!(cache = %cache.name(), ?key, size = cache.size(), "put");
        Ok(())
    }

    fn on_get(&self, cache: &dyn CacheInfo, key: &K, _value: &V) -> ListenerResult {
        debug!(cache = %cache.name(), ?key, "get");
        Ok(())
    }

    fn on_remove(&self, cache: &dyn CacheInfo, key: &K, _value: &V) -> ListenerResult {
        debug!(cache = %cache.name(), ?key, size = cache.size(), "remove");
        Ok(())
    }

    fn on_expire(&self, cache: &dyn CacheInfo, key: &K, _value: &V) -> ListenerResult {
        debug!(cache = %cache.name(), ?key, size = cache.size(), "expire");
        Ok(())
    }

    fn on_clear_cache(&self, cache: &dyn CacheInfo) -> ListenerResult {
        info!(cache = %cache.name(), "cache cleared");
        Ok(())
    }
}
