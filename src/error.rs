//! Error types for the cache.
//!
//! Misses are never errors: lookups that find nothing return `None`. The
//! variants here cover rejected arguments and failures raised by user code
//! the cache calls back into (listeners and selectors).

use crate::listener::CacheEvent;
use thiserror::Error;

/// Boxed error returned by listener and selector callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// An argument was rejected before any state was touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A listener callback failed. The cache operation that triggered it
    /// has already been applied.
    #[error("cache listener failed during {event}")]
    Listener {
        /// The hook that was being invoked.
        event: CacheEvent,
        /// The error returned by the listener.
        #[source]
        source: BoxError,
    },

    /// The `on_select` callback passed to `select` failed.
    #[error("cache selector failed")]
    Selector(#[source] BoxError),
}

impl CacheError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        CacheError::InvalidArgument(message.into())
    }
}

/// Convenience result alias for cache operations.
pub type Result<T> = core::result::Result<T, CacheError>;

/// Raised by the diagnostic consistency checks when the cached size
/// counters disagree with the structures they describe.
///
/// Never produced by normal cache operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    /// The queue's cached length differs from the number of linked nodes.
    #[error("the cached queue size {cached} is different from the effective queue size {effective}")]
    QueueSize {
        /// Value of the cached counter.
        cached: usize,
        /// Number of nodes found by walking the list.
        effective: usize,
    },

    /// The lookup index and the ordering queue hold a different number of entries.
    #[error("the map size {index} is different from the queue size {queue}")]
    IndexQueueMismatch {
        /// Number of bindings in the lookup index.
        index: usize,
        /// Number of entries in the ordering queue.
        queue: usize,
    },
}
