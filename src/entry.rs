//! Cache Entry Type
//!
//! A [`CacheEntry`] is the unit stored by the cache: the key, the value, the
//! absolute expiration time and a generation serial. Entries are immutable
//! once built and are shared (via `Arc`) between the lookup index and the
//! ordering queue.
//!
//! # Queue Membership
//!
//! Besides the data, every entry carries a small membership cell recording
//! where it sits in the ordering queue:
//!
//! ```text
//!   Pending ──insert──▶ Linked(handle) ──remove/trim──▶ Detached
//!      │                                                   ▲
//!      └──────────────────remove (before insert)───────────┘
//! ```
//!
//! The cell is only written while the queue's mutation lock is held, so a
//! racing pair of removes can never unlink the same node twice, and a remove
//! that overtakes the matching insert keeps the entry out of the queue.
//!
//! # Generations
//!
//! Each entry gets a serial from its cache's counter when it is created. A
//! rebinding of the same key always produces a new serial, which is what the
//! lookup index compares when asked to remove a binding only if it is still
//! the expected one.

use core::fmt;
use crossbeam_utils::atomic::AtomicCell;
use generational_arena::Index;

/// Position of an entry relative to the ordering queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Membership {
    /// Created, not yet linked.
    Pending,
    /// Linked at the given arena slot.
    Linked(Index),
    /// Unlinked, or removed before it could be linked. Terminal.
    Detached,
}

/// Immutable key/value pair with expiration metadata.
///
/// # Examples
///
/// ```
/// use fifo_cache::entry::CacheEntry;
///
/// let entry = CacheEntry::new("user:1", "Alice", Some(1_000), 7);
/// assert_eq!(*entry.key(), "user:1");
/// assert!(entry.is_valid_at(999));
/// assert!(!entry.is_valid_at(1_000));
///
/// let forever = CacheEntry::new("user:2", "Bob", None, 8);
/// assert!(forever.is_valid_at(u64::MAX));
/// ```
pub struct CacheEntry<K, V> {
    key: K,
    value: V,
    /// Absolute expiration time in milliseconds, `None` for never.
    expires_at: Option<u64>,
    serial: u64,
    membership: AtomicCell<Membership>,
}

impl<K, V> CacheEntry<K, V> {
    /// Creates a new entry that has not been queued yet.
    ///
    /// # Arguments
    ///
    /// * `key` - The cache key
    /// * `value` - The cached value
    /// * `expires_at` - Absolute expiration time in milliseconds, `None` to never expire
    /// * `serial` - Generation serial, unique within the owning cache
    #[inline]
    pub fn new(key: K, value: V, expires_at: Option<u64>, serial: u64) -> Self {
        Self {
            key,
            value,
            expires_at,
            serial,
            membership: AtomicCell::new(Membership::Pending),
        }
    }

    /// Returns the key.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns the value.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns the absolute expiration time in milliseconds, or `None` if
    /// the entry never expires.
    #[inline]
    pub fn expire_time(&self) -> Option<u64> {
        self.expires_at
    }

    /// Returns the generation serial.
    #[inline]
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Returns `true` if the entry has not expired at `now_millis`.
    #[inline]
    pub fn is_valid_at(&self, now_millis: u64) -> bool {
        match self.expires_at {
            Some(expires_at) => now_millis < expires_at,
            None => true,
        }
    }

    /// Returns `true` while the entry is linked into an ordering queue.
    #[inline]
    pub fn is_queued(&self) -> bool {
        matches!(self.membership.load(), Membership::Linked(_))
    }

    #[inline]
    pub(crate) fn membership(&self) -> Membership {
        self.membership.load()
    }

    #[inline]
    pub(crate) fn set_membership(&self, membership: Membership) {
        self.membership.store(membership);
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CacheEntry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("expires_at", &self.expires_at)
            .field("serial", &self.serial)
            .field("membership", &self.membership.load())
            .finish()
    }
}
