use crate::cache::{Cache, Clear, Presence};
use crate::CacheEntry;
use dashmap::DashMap;
use std::fmt;
use std::time::Duration;

/// Default in-memory cache used when no cache factory is configured.
///
/// Entries live in a [`DashMap`] keyed by the cache key, so every key maps to
/// at most one entry and a later `set` replaces the earlier value.
///
/// When a memoized function delegates expiration to the cache, the `max_age`
/// received by [`Cache::set`] is recorded on the entry and enforced lazily:
/// an expired entry is reported absent and dropped the next time it is looked
/// up. Bulk removal is supported.
///
/// # Examples
///
/// ```
/// use memento_core::{Cache, MemoryCache};
///
/// let cache = MemoryCache::new();
/// cache.set("answer", 42, None);
///
/// assert_eq!(cache.get("answer"), Some(42));
/// assert_eq!(cache.len(), 1);
///
/// cache.clearable().expect("memory cache supports clear").clear();
/// assert!(cache.is_empty());
/// ```
pub struct MemoryCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // The entry guard must not be held here: DashMap shards deadlock on
    // re-entrant access from the same thread.
    fn purge_if_expired(&self, key: &str) {
        self.entries.remove_if(key, |_, entry| entry.is_expired());
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for MemoryCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<V> Clear for MemoryCache<V> {
    fn clear(&self) {
        self.entries.clear();
    }
}

impl<V> Cache<V> for MemoryCache<V>
where
    V: Clone + Send + Sync,
{
    fn has(&self, key: &str) -> Presence {
        self.purge_if_expired(key);
        Presence::Known(self.entries.contains_key(key))
    }

    fn get(&self, key: &str) -> Option<V> {
        self.purge_if_expired(key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: V, max_age: Option<Duration>) {
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, max_age));
    }

    fn delete(&self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some((_, entry)) => !entry.is_expired(),
            None => false,
        }
    }

    fn clearable(&self) -> Option<&dyn Clear> {
        Some(self)
    }
}
