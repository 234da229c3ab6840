//! Lookup Index
//!
//! Concurrent key → entry map. Backed by `papaya::HashMap`, so reads never
//! take a lock and writers never block readers.
//!
//! Conditional removal compares generation serials rather than pointer
//! identity: [`LookupIndex::remove_if_same`] only drops a binding whose entry
//! carries the expected serial, so a remove computed from stale state cannot
//! delete an entry that replaced it in the meantime.

use crate::entry::CacheEntry;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::sync::Arc;

/// Lock-free map from keys to their current entry.
pub struct LookupIndex<K, V, S> {
    map: papaya::HashMap<K, Arc<CacheEntry<K, V>>, S>,
}

impl<K, V, S> LookupIndex<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty index using `hash_builder`.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            map: papaya::HashMap::with_hasher(hash_builder),
        }
    }

    /// Binds `key` to `entry`, returning the entry it replaced.
    pub fn put(&self, key: K, entry: Arc<CacheEntry<K, V>>) -> Option<Arc<CacheEntry<K, V>>> {
        self.map.pin().insert(key, entry).cloned()
    }

    /// Returns the entry bound to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<CacheEntry<K, V>>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.pin().get(key).cloned()
    }

    /// Removes the binding for `key` only if it is still `expected`.
    ///
    /// Returns `true` if this call removed it.
    pub fn remove_if_same<Q>(&self, key: &Q, expected: &CacheEntry<K, V>) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let serial = expected.serial();
        matches!(
            self.map
                .pin()
                .remove_if(key, |_, current| current.serial() == serial),
            Ok(Some(_))
        )
    }

    /// Removes the binding for `key` unconditionally.
    pub fn remove<Q>(&self, key: &Q) -> Option<Arc<CacheEntry<K, V>>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.pin().remove(key).cloned()
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the entries bound at the time of the call.
    ///
    /// Bindings changed while the snapshot is taken may or may not be seen.
    pub fn snapshot(&self) -> Vec<Arc<CacheEntry<K, V>>> {
        let map = self.map.pin();
        map.iter().map(|(_, entry)| Arc::clone(entry)).collect()
    }
}

impl<K, V, S> fmt::Debug for LookupIndex<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupIndex")
            .field("len", &self.map.len())
            .finish()
    }
}
