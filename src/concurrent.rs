//! Concurrent Cache Implementations
//!
//! Thread-safe caches meant to be shared behind an `Arc` and called from any
//! number of threads without external locking.
//!
//! # Architecture
//!
//! Unlike recency or frequency based policies, FIFO never reorders on read,
//! so `get()` is a true read. That lets the cache split its state in two:
//!
//! - A **lookup index** (`papaya::HashMap`) that answers `get()` without
//!   taking any lock.
//! - An **ordering queue** (an arena-backed doubly linked list behind a
//!   `parking_lot::Mutex`) touched only by writes, removals and trims.
//!
//! The two are kept in agreement by the write protocols rather than by a
//! common lock, so concurrent readers never wait on writers.
//!
//! # Available Concurrent Caches
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ConcurrentFifoCache`] | Bounded FIFO cache with TTL expiration and listeners |
//!
//! # Performance Characteristics
//!
//! - **Read latency**: O(1), lock-free
//! - **Write latency**: O(1) amortized plus the number of evicted entries
//! - **Bound**: soft; a write that races an in-progress trim leaves the
//!   overshoot for the next write
//!
//! # Example
//!
//! ```rust
//! use fifo_cache::concurrent::ConcurrentFifoCache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(ConcurrentFifoCache::new(1000));
//!
//! let handles: Vec<_> = (0..4).map(|t| {
//!     let cache = Arc::clone(&cache);
//!     thread::spawn(move || {
//!         for i in 0..1000 {
//!             let key = format!("key_{}_{}", t, i);
//!             cache.put(key.clone(), i).unwrap();
//!             let _ = cache.get(&key);
//!         }
//!     })
//! }).collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert!(cache.size() <= 1000 + 4);
//! ```

pub mod fifo;

pub use fifo::ConcurrentFifoCache;
