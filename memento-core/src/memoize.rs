//! The memoizer: wraps a function around a [`Cache`].

use crate::cache::{Cache, Presence};
use crate::error::{MemoizeError, Result};
use crate::options::{KeyFn, Options, ValueAccept};
use crate::utils;
#[cfg(feature = "stats")]
use crate::CacheStats;
use futures::future::{self, BoxFuture, Either, Ready};
use std::convert::Infallible;
use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// State shared by every clone of a memoized function: the cache and the
/// rules for addressing it and expiring its entries.
pub(crate) struct MemoCore<A, V> {
    cache: Arc<dyn Cache<V>>,
    cache_key: KeyFn<A>,
    max_age: Option<Duration>,
    cache_handles_expiration: bool,
    #[cfg(feature = "stats")]
    stats: CacheStats,
}

impl<A, V> MemoCore<A, V>
where
    A: 'static,
    V: Send + 'static,
{
    pub(crate) fn new<E>(options: &Options<A, V, E>) -> Self {
        Self {
            cache: options.build_cache(),
            cache_key: Arc::clone(&options.cache_key),
            max_age: options.max_age,
            cache_handles_expiration: options.cache_handles_expiration,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
        }
    }

    pub(crate) fn key(&self, args: &A) -> String {
        (self.cache_key)(args)
    }

    pub(crate) fn lookup(&self, key: &str) -> Presence {
        self.cache.has(key)
    }

    /// Resolves an existence check into the cached value, if any.
    ///
    /// An entry that vanished between `has` and `get` (an expiration firing
    /// in between) counts as a miss.
    pub(crate) fn cached(&self, key: &str, found: bool) -> Option<V> {
        let value = if found { self.cache.get(key) } else { None };
        match value {
            Some(value) => {
                trace!(key, "memoized call hit");
                #[cfg(feature = "stats")]
                self.stats.record_hit();
                Some(value)
            }
            None => {
                trace!(key, "memoized call missed");
                #[cfg(feature = "stats")]
                self.stats.record_miss();
                None
            }
        }
    }

    /// Writes `value` under `key` according to the expiration rules.
    ///
    /// With memoizer-managed expiration every store schedules its own
    /// deletion of `key`. The timer is never cancelled: if the key was
    /// overwritten in the meantime, the newer value is deleted when the older
    /// timer fires.
    pub(crate) fn store(&self, key: String, value: V) {
        #[cfg(feature = "stats")]
        self.stats.record_store();

        match self.max_age {
            Some(max_age) if self.cache_handles_expiration => {
                debug!(key = %key, ?max_age, "storing result, cache enforces expiration");
                self.cache.set(&key, value, Some(max_age));
            }
            Some(max_age) => {
                debug!(key = %key, ?max_age, "storing result, deletion scheduled");
                self.cache.set(&key, value, None);
                let cache = Arc::downgrade(&self.cache);
                utils::run_after(max_age, move || {
                    if let Some(cache) = cache.upgrade() {
                        let removed = cache.delete(&key);
                        trace!(key = %key, removed, "memoized entry expired");
                    }
                });
            }
            None => {
                debug!(key = %key, "storing result");
                self.cache.set(&key, value, None);
            }
        }
    }

    pub(crate) fn reject(&self, key: &str) {
        debug!(key, "result not accepted for caching");
        #[cfg(feature = "stats")]
        self.stats.record_rejection();
    }

    pub(crate) fn delete(&self, args: &A) -> bool {
        let key = self.key(args);
        let removed = self.cache.delete(&key);
        debug!(key = %key, removed, "deleted memoized entry");
        removed
    }

    pub(crate) fn clear(&self) -> Result<()> {
        match self.cache.clearable() {
            Some(clearable) => {
                clearable.clear();
                debug!("cleared memoized entries");
                Ok(())
            }
            None => {
                warn!("cache does not support clear");
                Err(MemoizeError::Unsupported { operation: "clear" })
            }
        }
    }

    pub(crate) fn cache(&self) -> &Arc<dyn Cache<V>> {
        &self.cache
    }

    #[cfg(feature = "stats")]
    pub(crate) fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

/// Result of calling a memoized function.
///
/// The call completes immediately when the cache answers its existence check
/// immediately, and becomes [`Outcome::Pending`] when the cache answers with
/// [`Presence::Pending`]. `Outcome` implements [`IntoFuture`], so callers that
/// do not know which cache they run on can simply `.await` it.
///
/// # Examples
///
/// ```
/// use memento_core::{memoize, Options, Outcome};
///
/// let square = memoize(|(x,): (u64,)| x * x, Options::default());
///
/// match square.call((4,)) {
///     Outcome::Ready(value) => assert_eq!(value, 16),
///     Outcome::Pending(_) => unreachable!("memory cache answers immediately"),
/// }
/// ```
pub enum Outcome<V> {
    /// The call completed; this is the cached or freshly computed value.
    Ready(V),
    /// The call waits on the cache's existence check. Nothing has been
    /// invoked or stored until the future is polled.
    Pending(BoxFuture<'static, V>),
}

impl<V> Outcome<V> {
    /// Whether the call completed without waiting on the cache.
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    /// Returns the value of a completed call.
    ///
    /// A pending call is dropped and yields `None`; the lookup it was waiting
    /// on never completes, so the wrapped function is not invoked.
    pub fn ready(self) -> Option<V> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::Pending(_) => None,
        }
    }
}

impl<V> IntoFuture for Outcome<V> {
    type Output = V;
    type IntoFuture = Either<Ready<V>, BoxFuture<'static, V>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Outcome::Ready(value) => Either::Left(future::ready(value)),
            Outcome::Pending(pending) => Either::Right(pending),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Outcome<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Outcome::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A memoized function returning plain values.
///
/// Created by [`memoize`]. Clones share the same cache.
pub struct Memoized<A, V> {
    core: Arc<MemoCore<A, V>>,
    func: Arc<dyn Fn(A) -> V + Send + Sync>,
    value_accept: Option<ValueAccept<V, Infallible>>,
}

/// Wraps `func` so that its results are cached by argument tuple.
///
/// The arguments of the wrapped function form one tuple: `()` for none,
/// `(x,)` for one, `(x, y)` for two and so on.
///
/// # Examples
///
/// ```
/// use memento_core::{memoize, Options};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let runs = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&runs);
/// let greet = memoize(
///     move |(name, excited): (String, bool)| {
///         counter.fetch_add(1, Ordering::SeqCst);
///         format!("hello {}{}", name, if excited { "!" } else { "" })
///     },
///     Options::default(),
/// );
///
/// let first = greet.call(("ada".to_string(), true)).ready();
/// let second = greet.call(("ada".to_string(), true)).ready();
///
/// assert_eq!(first.as_deref(), Some("hello ada!"));
/// assert_eq!(first, second);
/// assert_eq!(runs.load(Ordering::SeqCst), 1);
///
/// assert!(greet.delete(&("ada".to_string(), true)));
/// greet.call(("ada".to_string(), true));
/// assert_eq!(runs.load(Ordering::SeqCst), 2);
/// ```
pub fn memoize<A, V, F>(func: F, options: Options<A, V>) -> Memoized<A, V>
where
    A: Send + 'static,
    V: Clone + Send + 'static,
    F: Fn(A) -> V + Send + Sync + 'static,
{
    Memoized {
        core: Arc::new(MemoCore::new(&options)),
        func: Arc::new(func),
        value_accept: options.value_accept,
    }
}

impl<A, V> Memoized<A, V>
where
    A: Send + 'static,
    V: Clone + Send + 'static,
{
    /// Calls the memoized function.
    ///
    /// On a hit the cached value is returned and the wrapped function is not
    /// invoked. On a miss the function runs and its value is stored unless
    /// the acceptance predicate refuses it. The value is returned unchanged
    /// either way.
    pub fn call(&self, args: A) -> Outcome<V> {
        let key = self.core.key(&args);
        match self.core.lookup(&key) {
            Presence::Known(found) => Outcome::Ready(self.resolve(key, found, args)),
            Presence::Pending(lookup) => {
                let this = self.clone();
                Outcome::Pending(Box::pin(async move {
                    let found = lookup.await;
                    this.resolve(key, found, args)
                }))
            }
        }
    }

    fn resolve(&self, key: String, found: bool, args: A) -> V {
        if let Some(value) = self.core.cached(&key, found) {
            return value;
        }

        let value = (self.func)(args);
        let accepted = match &self.value_accept {
            Some(accept) => accept(Ok(&value)),
            None => true,
        };
        if accepted {
            self.core.store(key, value.clone());
        } else {
            self.core.reject(&key);
        }
        value
    }

    /// Removes the entry cached for `args`. Returns whether one was present.
    pub fn delete(&self, args: &A) -> bool {
        self.core.delete(args)
    }

    /// Removes every cached entry.
    ///
    /// Fails with [`MemoizeError::Unsupported`] when the cache has no bulk
    /// removal; the entries are left untouched in that case.
    pub fn clear(&self) -> Result<()> {
        self.core.clear()
    }

    pub fn cache(&self) -> &Arc<dyn Cache<V>> {
        self.core.cache()
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        self.core.stats()
    }
}

impl<A, V> Clone for Memoized<A, V> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            func: Arc::clone(&self.func),
            value_accept: self.value_accept.clone(),
        }
    }
}

impl<A, V> fmt::Debug for Memoized<A, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("max_age", &self.core.max_age)
            .field("cache_handles_expiration", &self.core.cache_handles_expiration)
            .finish_non_exhaustive()
    }
}
