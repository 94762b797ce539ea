// Test caches shared by the integration tests.
#![allow(dead_code)]

use memento_core::{Cache, Clear, MemoryCache, Presence};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A cache without bulk removal.
#[derive(Default)]
pub struct NoClearCache<V> {
    entries: Mutex<HashMap<String, V>>,
}

impl<V> NoClearCache<V> {
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

impl<V: Clone + Send> Cache<V> for NoClearCache<V> {
    fn has(&self, key: &str) -> Presence {
        self.entries.lock().contains_key(key).into()
    }

    fn get(&self, key: &str) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: V, _max_age: Option<Duration>) {
        self.entries.lock().insert(key.to_string(), value);
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }
}

/// A cache whose existence check answers after yielding to the scheduler.
pub struct DeferredCache<V> {
    inner: Arc<MemoryCache<V>>,
}

impl<V> DeferredCache<V> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryCache::new()),
        }
    }
}

impl<V> Cache<V> for DeferredCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn has(&self, key: &str) -> Presence {
        // The answer reflects the moment of the request, like a round trip
        // to a remote store.
        let found = matches!(self.inner.has(key), Presence::Known(true));
        Presence::Pending(Box::pin(async move {
            tokio::task::yield_now().await;
            found
        }))
    }

    fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: V, max_age: Option<Duration>) {
        self.inner.set(key, value, max_age)
    }

    fn delete(&self, key: &str) -> bool {
        self.inner.delete(key)
    }

    fn clearable(&self) -> Option<&dyn Clear> {
        self.inner.clearable()
    }
}

/// Records the `max_age` handed to every `set`.
#[derive(Default)]
pub struct RecordingCache<V> {
    inner: MemoryCache<V>,
    pub set_calls: Mutex<Vec<(String, Option<Duration>)>>,
}

impl<V> Cache<V> for RecordingCache<V>
where
    V: Clone + Send + Sync,
{
    fn has(&self, key: &str) -> Presence {
        self.inner.has(key)
    }

    fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: V, max_age: Option<Duration>) {
        self.set_calls.lock().push((key.to_string(), max_age));
        self.inner.set(key, value, max_age)
    }

    fn delete(&self, key: &str) -> bool {
        self.inner.delete(key)
    }

    fn clearable(&self) -> Option<&dyn Clear> {
        self.inner.clearable()
    }
}

/// Lets detached storage tasks run on the current-thread test runtime.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
