use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Answer of a cache existence check.
///
/// Backends that can answer locally return [`Presence::Known`]. Backends that
/// need to go somewhere else first (a remote store, a lazily loaded index)
/// return [`Presence::Pending`], and every call of the memoized function that
/// hits such a lookup becomes awaitable.
///
/// # Examples
///
/// ```
/// use memento_core::Presence;
///
/// let presence: Presence = true.into();
/// assert!(matches!(presence, Presence::Known(true)));
/// ```
pub enum Presence {
    /// The answer is available immediately.
    Known(bool),
    /// The answer becomes available once the future resolves.
    Pending(BoxFuture<'static, bool>),
}

impl From<bool> for Presence {
    fn from(found: bool) -> Self {
        Presence::Known(found)
    }
}

impl fmt::Debug for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presence::Known(found) => f.debug_tuple("Known").field(found).finish(),
            Presence::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Optional bulk-removal capability of a [`Cache`].
pub trait Clear {
    /// Removes every entry.
    fn clear(&self);
}

/// Storage contract consumed by memoized functions.
///
/// A cache maps string keys to values. All operations take `&self`: the cache
/// is shared between the memoized function and its expiration timers, so
/// implementations use interior mutability (see [`MemoryCache`](crate::MemoryCache)).
///
/// Bulk removal is optional. A backend that supports it returns itself from
/// [`Cache::clearable`]; the default answers `None`, and clearing a memoized
/// function backed by such a cache fails with
/// [`MemoizeError::Unsupported`](crate::MemoizeError::Unsupported).
///
/// # Examples
///
/// A read-mostly backend without bulk removal:
///
/// ```
/// use memento_core::{Cache, Presence};
/// use std::collections::HashMap;
/// use std::sync::Mutex;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Catalog(Mutex<HashMap<String, String>>);
///
/// impl Cache<String> for Catalog {
///     fn has(&self, key: &str) -> Presence {
///         self.0.lock().unwrap().contains_key(key).into()
///     }
///
///     fn get(&self, key: &str) -> Option<String> {
///         self.0.lock().unwrap().get(key).cloned()
///     }
///
///     fn set(&self, key: &str, value: String, _max_age: Option<Duration>) {
///         self.0.lock().unwrap().insert(key.to_string(), value);
///     }
///
///     fn delete(&self, key: &str) -> bool {
///         self.0.lock().unwrap().remove(key).is_some()
///     }
/// }
///
/// let catalog = Catalog::default();
/// catalog.set("a", "b".to_string(), None);
/// assert_eq!(catalog.get("a"), Some("b".to_string()));
/// assert!(catalog.clearable().is_none());
/// ```
pub trait Cache<V>: Send + Sync {
    /// Checks whether `key` currently has an entry.
    fn has(&self, key: &str) -> Presence;

    /// Returns a copy of the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<V>;

    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// `max_age` is only passed when the memoized function delegates
    /// expiration to the cache; the cache is then responsible for dropping
    /// the entry once it is that old.
    fn set(&self, key: &str, value: V, max_age: Option<Duration>);

    /// Removes the entry under `key`. Returns whether an entry was present.
    fn delete(&self, key: &str) -> bool;

    /// Capability probe for bulk removal.
    fn clearable(&self) -> Option<&dyn Clear> {
        None
    }
}

impl<V, C> Cache<V> for Arc<C>
where
    C: Cache<V> + ?Sized,
{
    fn has(&self, key: &str) -> Presence {
        (**self).has(key)
    }

    fn get(&self, key: &str) -> Option<V> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: V, max_age: Option<Duration>) {
        (**self).set(key, value, max_age)
    }

    fn delete(&self, key: &str) -> bool {
        (**self).delete(key)
    }

    fn clearable(&self) -> Option<&dyn Clear> {
        (**self).clearable()
    }
}
