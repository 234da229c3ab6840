//! Ordering Queue
//!
//! Records the insertion order of cache entries so the oldest one can be
//! evicted first. The queue is a doubly linked list whose nodes live in a
//! generational arena; two sentinel nodes (head and tail) are allocated
//! first and never carry an entry.
//!
//! ```text
//!   head ⇄ newest ⇄ ... ⇄ oldest ⇄ tail
//!    ▲                              ▲
//!  insert                         trim
//! ```
//!
//! # Concurrency
//!
//! Every link mutation (`insert`, `remove`, the body of `trim`) runs under a
//! single `parking_lot::Mutex`. The lock is held for relinking only: no
//! callbacks, no index operations.
//!
//! A separate `AtomicBool` admits at most one trimmer at a time. A thread
//! that loses the compare-and-swap returns `None` straight away instead of
//! waiting, so the bound handed to [`Queue::trim`] is soft: the queue may
//! briefly hold more entries than asked for, and the next writer trims again.
//!
//! The length is cached in an atomic so [`Queue::len`] never takes the lock.
//! Outside the lock it is an estimate.

use crate::entry::{CacheEntry, Membership};
use crate::error::ConsistencyError;
use core::fmt;
use generational_arena::{Arena, Index};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// A node in the doubly linked list.
///
/// Sentinels carry no entry; `prev` of the head and `next` of the tail point
/// back at themselves and are never followed.
struct Node<K, V> {
    entry: Option<Arc<CacheEntry<K, V>>>,
    prev: Index,
    next: Index,
}

/// The list proper. Only ever touched through the queue's mutex.
struct Links<K, V> {
    nodes: Arena<Node<K, V>>,
    head: Index,
    tail: Index,
    len: usize,
}

impl<K, V> Links<K, V> {
    /// Allocates the two sentinels and links them together.
    fn construct() -> Self {
        let mut nodes = Arena::new();
        let placeholder = Index::from_raw_parts(0, 0);
        let head = nodes.insert(Node {
            entry: None,
            prev: placeholder,
            next: placeholder,
        });
        let tail = nodes.insert(Node {
            entry: None,
            prev: head,
            next: placeholder,
        });
        nodes[head].prev = head;
        nodes[head].next = tail;
        nodes[tail].next = tail;

        Links {
            nodes,
            head,
            tail,
            len: 0,
        }
    }

    /// Allocates a node for `entry` and attaches it after the head sentinel.
    fn push_front(&mut self, entry: Arc<CacheEntry<K, V>>) -> Index {
        let first = self.nodes[self.head].next;
        let index = self.nodes.insert(Node {
            entry: Some(entry),
            prev: self.head,
            next: first,
        });
        self.nodes[self.head].next = index;
        self.nodes[first].prev = index;
        self.len += 1;
        index
    }

    /// Detaches the node at `index` and frees its arena slot.
    ///
    /// Returns `None` for sentinels and for slots that are no longer live.
    fn unlink(&mut self, index: Index) -> Option<Arc<CacheEntry<K, V>>> {
        if index == self.head || index == self.tail {
            return None;
        }
        let node = self.nodes.remove(index)?;
        self.nodes[node.prev].next = node.next;
        self.nodes[node.next].prev = node.prev;
        self.len -= 1;
        node.entry
    }

    /// Counts the nodes between the sentinels.
    fn walk_len(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.nodes[self.head].next;
        while cursor != self.tail {
            count += 1;
            cursor = self.nodes[cursor].next;
        }
        count
    }
}

/// Resets the trimming flag when the trimmer leaves, however it leaves.
struct TrimGuard<'a>(&'a AtomicBool);

impl Drop for TrimGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Insertion-ordered queue of cache entries with a cooperative trimmer.
///
/// # Examples
///
/// ```ignore
/// use fifo_cache::queue::Queue;
///
/// let queue = Queue::new();
/// queue.insert(entry_a.clone());
/// queue.insert(entry_b.clone());
///
/// // Evicts the oldest entry (a).
/// let evicted = queue.trim(1).unwrap();
/// assert_eq!(evicted.len(), 1);
/// ```
pub struct Queue<K, V> {
    links: Mutex<Links<K, V>>,
    /// Cached length, written under the lock, read without it.
    size: AtomicUsize,
    trimming: AtomicBool,
}

impl<K, V> Queue<K, V> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            links: Mutex::new(Links::construct()),
            size: AtomicUsize::new(0),
            trimming: AtomicBool::new(false),
        }
    }

    /// Returns the cached number of entries.
    ///
    /// Exact only while no mutation is in flight.
    #[inline]
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    /// Returns `true` if the cached length is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn set_trimming(&self, trimming: bool) {
        self.trimming.store(trimming, Ordering::SeqCst);
    }

    /// Links `entry` as the newest element.
    ///
    /// Returns `false` without linking if the entry was already removed
    /// before it reached the queue (a racing `remove` won), or if it is
    /// already linked.
    pub fn insert(&self, entry: Arc<CacheEntry<K, V>>) -> bool {
        let mut links = self.links.lock();
        if entry.membership() != Membership::Pending {
            trace!(
                serial = entry.serial(),
                "skipping insert of an entry that is no longer pending"
            );
            return false;
        }
        let serial = entry.serial();
        let handle = links.push_front(Arc::clone(&entry));
        entry.set_membership(Membership::Linked(handle));
        self.size.store(links.len, Ordering::Release);
        trace!(serial, queue_size = links.len, "added item to queue");
        true
    }

    /// Unlinks `entry` if it is still a member.
    ///
    /// Returns `true` only for the call that actually removed it. An entry
    /// that was never linked is marked detached so a later `insert` of it
    /// becomes a no-op; that also counts as a removal.
    pub fn remove(&self, entry: &CacheEntry<K, V>) -> bool {
        let mut links = self.links.lock();
        match entry.membership() {
            Membership::Linked(handle) => {
                let removed = links.unlink(handle).is_some();
                entry.set_membership(Membership::Detached);
                self.size.store(links.len, Ordering::Release);
                trace!(
                    serial = entry.serial(),
                    queue_size = links.len,
                    "removed item from queue"
                );
                removed
            }
            Membership::Pending => {
                entry.set_membership(Membership::Detached);
                trace!(serial = entry.serial(), "removed item before it was queued");
                true
            }
            Membership::Detached => {
                trace!(
                    serial = entry.serial(),
                    "attempt to remove item concurrently removed"
                );
                false
            }
        }
    }

    /// Evicts the oldest entries until at most `target` remain.
    ///
    /// Returns the evicted entries, oldest first. Returns `None` without
    /// doing anything if another thread is already trimming this queue, in
    /// which case the queue may stay above `target` until the next call.
    pub fn trim(&self, target: usize) -> Option<Vec<Arc<CacheEntry<K, V>>>> {
        if self
            .trimming
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            trace!(target, "trim skipped, another thread is trimming");
            return None;
        }
        let _guard = TrimGuard(&self.trimming);

        let mut links = self.links.lock();
        let mut evicted = Vec::new();
        if links.len > target {
            evicted.reserve(links.len - target);
            while links.len > target {
                let oldest = links.nodes[links.tail].prev;
                match links.unlink(oldest) {
                    Some(entry) => {
                        entry.set_membership(Membership::Detached);
                        evicted.push(entry);
                    }
                    None => break,
                }
            }
            self.size.store(links.len, Ordering::Release);
            trace!(
                target,
                evicted = evicted.len(),
                queue_size = links.len,
                "trimmed queue"
            );
        }
        Some(evicted)
    }

    /// Walks the list and checks the cached length against it.
    pub fn assert_consistency(&self) -> Result<(), ConsistencyError> {
        let links = self.links.lock();
        let cached = self.size.load(Ordering::Acquire);
        let effective = links.walk_len();
        if cached != effective || links.len != effective {
            return Err(ConsistencyError::QueueSize { cached, effective });
        }
        Ok(())
    }

    /// Returns the queued entries, newest first.
    pub fn snapshot(&self) -> Vec<Arc<CacheEntry<K, V>>> {
        let links = self.links.lock();
        let mut out = Vec::with_capacity(links.len);
        let mut cursor = links.nodes[links.head].next;
        while cursor != links.tail {
            let node = &links.nodes[cursor];
            if let Some(entry) = &node.entry {
                out.push(Arc::clone(entry));
            }
            cursor = node.next;
        }
        out
    }
}

impl<K, V> Default for Queue<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Queue<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("length", &self.len())
            .field("trimming", &self.trimming.load(Ordering::Relaxed))
            .finish()
    }
}
