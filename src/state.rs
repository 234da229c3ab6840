//! Cache Coordinator
//!
//! [`CacheState`] pairs one lookup index with one ordering queue and runs the
//! get/put/remove protocols across both. Everything that outlives a
//! `clear_cache` (bound, TTL, counters, listeners, clock) lives in
//! [`CacheShared`] and is passed in by the facade.
//!
//! The two structures are never mutated under a common lock. The protocols
//! below only guarantee that every indexed entry has exactly one queued node
//! (and vice versa) once all operations have finished:
//!
//! ```text
//! put:    index.put ─▶ queue.remove(previous) ─▶ queue.insert ─▶ queue.trim
//!                                                                  │
//!                      index.remove_if_same(evicted) ◀─────────────┘
//! get:    index.get ─▶ expired? index.remove_if_same ─▶ queue.remove
//! remove: index.remove ─▶ queue.remove
//! ```

use crate::entry::CacheEntry;
use crate::error::{CacheError, ConsistencyError, Result};
use crate::index::LookupIndex;
use crate::listener::{CacheEvent, CacheInfo, CacheListener, ListenerResult};
use crate::metrics::CacheCounters;
use crate::queue::Queue;
use crate::time::Clock;
use arc_swap::ArcSwap;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{trace, warn};

/// Listener list, replaced wholesale on registration.
pub(crate) type Listeners<K, V> = Vec<Arc<dyn CacheListener<K, V>>>;

/// Settings, counters and listeners shared by every state a cache goes through.
pub(crate) struct CacheShared<K, V> {
    pub(crate) name: RwLock<String>,
    pub(crate) label: RwLock<Option<String>>,
    pub(crate) max_size: AtomicUsize,
    pub(crate) live_time_millis: AtomicI64,
    pub(crate) log_enabled: AtomicBool,
    pub(crate) counters: CacheCounters,
    pub(crate) listeners: ArcSwap<Listeners<K, V>>,
    pub(crate) clock: Arc<dyn Clock>,
    serials: AtomicU64,
}

impl<K, V> CacheShared<K, V> {
    pub(crate) fn new(
        name: String,
        label: Option<String>,
        max_size: usize,
        live_time_millis: i64,
        log_enabled: bool,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            name: RwLock::new(name),
            label: RwLock::new(label),
            max_size: AtomicUsize::new(max_size),
            live_time_millis: AtomicI64::new(clamp_live_time(live_time_millis)),
            log_enabled: AtomicBool::new(log_enabled),
            counters: CacheCounters::default(),
            listeners: ArcSwap::from_pointee(Vec::new()),
            clock,
            serials: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn max_size(&self) -> usize {
        self.max_size.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn live_time_millis(&self) -> i64 {
        self.live_time_millis.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    #[inline]
    fn next_serial(&self) -> u64 {
        self.serials.fetch_add(1, Ordering::Relaxed)
    }

    /// Expiration for an entry written now, `None` when entries never expire.
    ///
    /// Must not be called while caching is disabled.
    pub(crate) fn expiration_for_write(&self) -> Option<u64> {
        let live_time = self.live_time_millis();
        if live_time > 0 {
            Some(self.now_millis().saturating_add(live_time.unsigned_abs()))
        } else {
            None
        }
    }

    /// Calls `hook` on every registered listener, stopping at the first error.
    pub(crate) fn notify<F>(&self, event: CacheEvent, mut hook: F) -> Result<()>
    where
        F: FnMut(&dyn CacheListener<K, V>) -> ListenerResult,
    {
        let listeners = self.listeners.load();
        for listener in listeners.iter() {
            if let Err(source) = hook(listener.as_ref()) {
                warn!(%event, error = %source, "cache listener failed");
                return Err(CacheError::Listener { event, source });
            }
        }
        Ok(())
    }
}

/// Normalizes a configured live time: any negative value means "never".
#[inline]
pub(crate) fn clamp_live_time(live_time_millis: i64) -> i64 {
    if live_time_millis < 0 {
        -1
    } else {
        live_time_millis
    }
}

/// What a listener sees of the cache while being notified.
pub(crate) struct ListenerContext<'a, K, V, S> {
    pub(crate) shared: &'a CacheShared<K, V>,
    pub(crate) state: &'a CacheState<K, V, S>,
}

impl<K, V, S> CacheInfo for ListenerContext<'_, K, V, S> {
    fn name(&self) -> String {
        self.shared.name.read().clone()
    }

    fn max_size(&self) -> usize {
        self.shared.max_size()
    }

    fn live_time_millis(&self) -> i64 {
        self.shared.live_time_millis()
    }

    fn size(&self) -> usize {
        self.state.queue.len()
    }
}

/// One lookup index and one ordering queue, replaced as a pair on clear.
pub(crate) struct CacheState<K, V, S> {
    pub(crate) index: LookupIndex<K, V, S>,
    pub(crate) queue: Queue<K, V>,
}

impl<K, V, S> CacheState<K, V, S>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
    S: BuildHasher,
{
    pub(crate) fn new(hash_builder: S) -> Self {
        Self {
            index: LookupIndex::with_hasher(hash_builder),
            queue: Queue::new(),
        }
    }

    fn context<'a>(&'a self, shared: &'a CacheShared<K, V>) -> ListenerContext<'a, K, V, S> {
        ListenerContext {
            shared,
            state: self,
        }
    }

    /// Looks `key` up, dropping the entry if it has expired.
    pub(crate) fn get<Q>(&self, shared: &CacheShared<K, V>, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        let Some(entry) = self.index.get(key) else {
            shared.counters.record_miss();
            return Ok(None);
        };

        let ctx = self.context(shared);
        if entry.is_valid_at(shared.now_millis()) {
            shared.counters.record_hit();
            shared.notify(CacheEvent::Get, |l| l.on_get(&ctx, entry.key(), entry.value()))?;
            return Ok(Some(entry.value().clone()));
        }

        shared.counters.record_miss();
        if self.index.remove_if_same(key, &entry) {
            self.queue.remove(&entry);
            shared.counters.record_expiration();
            trace!(serial = entry.serial(), "expired item removed on read");
        }
        // Whoever won the removal race, the caller observed an expiration.
        shared.notify(CacheEvent::Expire, |l| {
            l.on_expire(&ctx, entry.key(), entry.value())
        })?;
        Ok(None)
    }

    /// Binds `key` to `value` as the newest entry, evicting the oldest ones
    /// if the queue grows past the bound.
    pub(crate) fn put(
        &self,
        shared: &CacheShared<K, V>,
        expires_at: Option<u64>,
        key: K,
        value: V,
    ) -> Result<()> {
        let entry = Arc::new(CacheEntry::new(
            key.clone(),
            value,
            expires_at,
            shared.next_serial(),
        ));

        // The replaced entry loses its place; the new one goes in as newest.
        match self.index.put(key, Arc::clone(&entry)) {
            Some(previous) => {
                self.queue.remove(&previous);
                trace!(
                    previous = previous.serial(),
                    serial = entry.serial(),
                    "replaced item in the map"
                );
            }
            None => trace!(serial = entry.serial(), "added item to map"),
        }

        self.queue.insert(Arc::clone(&entry));
        shared.counters.record_put();

        let evicted = match self.queue.trim(shared.max_size()) {
            Some(evicted) => evicted,
            None => {
                shared.counters.record_skipped_trim();
                Vec::new()
            }
        };
        // Index cleanup for every evicted entry happens before any callback
        // so a failing listener cannot leave a binding without a queue node.
        for evicted_entry in &evicted {
            self.index.remove_if_same(evicted_entry.key(), evicted_entry);
        }
        shared.counters.record_evictions(evicted.len());

        let ctx = self.context(shared);
        for evicted_entry in &evicted {
            shared.notify(CacheEvent::Expire, |l| {
                l.on_expire(&ctx, evicted_entry.key(), evicted_entry.value())
            })?;
        }
        shared.notify(CacheEvent::Put, |l| l.on_put(&ctx, entry.key(), entry.value()))
    }

    /// Removes the binding for `key`, returning the value if it was still valid.
    pub(crate) fn remove<Q>(&self, shared: &CacheShared<K, V>, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        let Some(entry) = self.index.remove(key) else {
            return Ok(None);
        };
        trace!(serial = entry.serial(), "removed item from the map");

        let removed = self.queue.remove(&entry);
        let ctx = self.context(shared);
        if removed && entry.is_valid_at(shared.now_millis()) {
            shared.counters.record_removal();
            shared.notify(CacheEvent::Remove, |l| {
                l.on_remove(&ctx, entry.key(), entry.value())
            })?;
            Ok(Some(entry.value().clone()))
        } else {
            // Not removed here means a trim got it first and counted it.
            if removed {
                shared.counters.record_expiration();
            }
            shared.notify(CacheEvent::Expire, |l| {
                l.on_expire(&ctx, entry.key(), entry.value())
            })?;
            Ok(None)
        }
    }

    /// Entries that are still valid at `now_millis`.
    pub(crate) fn valid_entries(&self, now_millis: u64) -> Vec<Arc<CacheEntry<K, V>>> {
        let mut entries = self.index.snapshot();
        entries.retain(|entry| entry.is_valid_at(now_millis));
        entries
    }

    /// Checks the queue's own bookkeeping, then that both structures agree.
    pub(crate) fn assert_consistency(&self) -> core::result::Result<(), ConsistencyError> {
        self.queue.assert_consistency()?;
        let index = self.index.len();
        let queue = self.queue.len();
        if index != queue {
            return Err(ConsistencyError::IndexQueueMismatch { index, queue });
        }
        Ok(())
    }
}

impl<K, V, S> fmt::Debug for CacheState<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheState")
            .field("index", &self.index)
            .field("queue", &self.queue)
            .finish()
    }
}
