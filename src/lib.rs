#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │ CacheService ── region name ──▶ Arc<ConcurrentFifoCache>              │
//! │                                   │                                   │
//! │                                   ├── CacheShared (settings, counters,│
//! │                                   │   listeners, clock)               │
//! │                                   └── ArcSwap<CacheState>             │
//! │                                          ├── LookupIndex  (papaya)    │
//! │                                          └── Queue        (arena list)│
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Reference
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ConcurrentFifoCache`] | Bounded FIFO cache with TTL, shared across threads |
//! | [`CacheService`] | Registry of named caches built from configuration |
//! | [`CacheListener`] | Callbacks for put/get/remove/expire/clear |
//! | [`FifoCacheConfig`] | Bound, time to live, naming and logging settings |
//!
//! ```rust
//! use fifo_cache::{ConcurrentFifoCache, FifoCacheConfig};
//!
//! let cache = ConcurrentFifoCache::init(
//!     FifoCacheConfig::new("profiles", 2).with_live_time_millis(60_000),
//!     None,
//! );
//! cache.put("alice", 1).unwrap();
//! cache.put("bob", 2).unwrap();
//! cache.put("carol", 3).unwrap();
//!
//! assert_eq!(cache.get("alice").unwrap(), None);
//! assert_eq!(cache.get("carol").unwrap(), Some(3));
//! assert_eq!(cache.hits(), 1);
//! assert_eq!(cache.misses(), 1);
//! ```

#[cfg(test)]
extern crate scoped_threadpool;

/// Cache entry type.
///
/// An immutable key/value binding with its expiration time and the
/// bookkeeping that ties it to a queue node.
pub mod entry;

/// Error types.
pub mod error;

/// Time sources for expiration.
pub mod time;

/// Arena-backed ordering queue with a single-trimmer gate.
///
/// Keeps entries in insertion order and evicts the oldest ones when the
/// cache grows past its bound.
pub mod queue;

/// Lock-free key to entry index.
pub mod index;

/// Listener callbacks and the logging listener.
pub mod listener;

/// Cache configuration structures.
pub mod config;

/// Cache metrics system.
///
/// Counters updated by every operation and reported as a sorted map.
pub mod metrics;

pub(crate) mod state;

/// Concurrent cache implementations.
pub mod concurrent;

/// Registry of named caches.
pub mod service;

pub use concurrent::ConcurrentFifoCache;
pub use config::{CacheServiceConfig, FifoCacheConfig};
pub use entry::CacheEntry;
pub use error::{BoxError, CacheError, ConsistencyError, Result};
pub use listener::{CacheEvent, CacheInfo, CacheListener, ListenerResult, LoggingListener};
pub use metrics::{CacheMetrics, FifoCacheMetrics};
pub use service::CacheService;
pub use time::{Clock, ManualClock, SystemClock};
