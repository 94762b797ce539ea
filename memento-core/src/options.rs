use crate::cache::Cache;
use crate::keys::CacheKeyArgs;
use crate::MemoryCache;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Produces the cache backing one memoized function.
pub type CacheFactory<V> = Arc<dyn Fn() -> Arc<dyn Cache<V>> + Send + Sync>;

/// Derives the cache key of a call from its argument tuple.
pub type KeyFn<A> = Arc<dyn Fn(&A) -> String + Send + Sync>;

/// Decides whether a produced result should be stored.
///
/// Receives `Ok(&value)` for values and `Err(&error)` for failed eventual
/// results.
pub type ValueAccept<V, E> = Arc<dyn Fn(Result<&V, &E>) -> bool + Send + Sync>;

/// Configuration of a memoized function.
///
/// Every field is optional:
///
/// | option | default |
/// |---|---|
/// | cache factory | a fresh [`MemoryCache`] per memoized function |
/// | max age | none, entries live until deleted or cleared |
/// | cache key | [`CacheKeyArgs`] on the argument tuple |
/// | value accept | none, every value is stored |
/// | cache handles expiration | `false`, the memoizer schedules deletions |
///
/// The options are consumed when a function is wrapped; the wrapped function
/// cannot be reconfigured afterwards. Options are `Clone` so one configuration
/// can wrap several functions, each getting its own cache from the factory.
///
/// `E` is the error type of eventual results and stays [`Infallible`] for
/// functions returning plain values.
///
/// # Examples
///
/// ```
/// use memento_core::Options;
/// use std::time::Duration;
///
/// let options = Options::<(u32,), String>::default()
///     .with_max_age(Duration::from_secs(30))
///     .with_value_accept(|result| matches!(result, Ok(s) if !s.is_empty()));
///
/// assert_eq!(options.max_age(), Some(Duration::from_secs(30)));
/// ```
pub struct Options<A, V, E = Infallible> {
    pub(crate) cache: CacheFactory<V>,
    pub(crate) max_age: Option<Duration>,
    pub(crate) cache_key: KeyFn<A>,
    pub(crate) value_accept: Option<ValueAccept<V, E>>,
    pub(crate) cache_handles_expiration: bool,
}

impl<A, V, E> Options<A, V, E>
where
    A: 'static,
    V: Clone + Send + Sync + 'static,
    E: 'static,
{
    /// Creates options keyed by a custom function.
    ///
    /// This is the entry point for argument types without a default key,
    /// e.g. tuples holding types that do not implement `Debug`.
    pub fn keyed_by<K>(cache_key: K) -> Self
    where
        K: Fn(&A) -> String + Send + Sync + 'static,
    {
        Self {
            cache: Arc::new(|| Arc::new(MemoryCache::<V>::new()) as Arc<dyn Cache<V>>),
            max_age: None,
            cache_key: Arc::new(cache_key),
            value_accept: None,
            cache_handles_expiration: false,
        }
    }
}

impl<A, V, E> Default for Options<A, V, E>
where
    A: CacheKeyArgs + 'static,
    V: Clone + Send + Sync + 'static,
    E: 'static,
{
    fn default() -> Self {
        Self::keyed_by(|args: &A| args.cache_key())
    }
}

impl<A, V, E> Options<A, V, E>
where
    A: 'static,
    V: 'static,
    E: 'static,
{
    /// Sets the factory producing the cache of each wrapped function.
    ///
    /// Returning clones of one shared `Arc` makes several functions share a
    /// cache; keeping their keys apart is then up to the caller.
    pub fn with_cache<C, F>(mut self, factory: F) -> Self
    where
        C: Cache<V> + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.cache = Arc::new(move || Arc::new(factory()) as Arc<dyn Cache<V>>);
        self
    }

    /// Sets how long a stored value stays valid. A zero duration means forever.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = (!max_age.is_zero()).then_some(max_age);
        self
    }

    /// Sets the max age in milliseconds. Zero or negative values mean forever.
    pub fn with_max_age_millis(self, millis: i64) -> Self {
        let millis = u64::try_from(millis).unwrap_or(0);
        self.with_max_age(Duration::from_millis(millis))
    }

    /// Replaces the key derivation.
    pub fn with_cache_key<K>(mut self, cache_key: K) -> Self
    where
        K: Fn(&A) -> String + Send + Sync + 'static,
    {
        self.cache_key = Arc::new(cache_key);
        self
    }

    /// Only results accepted by `accept` are stored.
    pub fn with_value_accept<P>(mut self, accept: P) -> Self
    where
        P: Fn(Result<&V, &E>) -> bool + Send + Sync + 'static,
    {
        self.value_accept = Some(Arc::new(accept));
        self
    }

    /// Hands the max age to the cache on every store instead of scheduling
    /// deletions from the memoizer.
    pub fn with_cache_handles_expiration(mut self, enabled: bool) -> Self {
        self.cache_handles_expiration = enabled;
        self
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    pub fn cache_handles_expiration(&self) -> bool {
        self.cache_handles_expiration
    }
}

impl<A, V, E> Options<A, V, E> {
    pub(crate) fn build_cache(&self) -> Arc<dyn Cache<V>> {
        (self.cache)()
    }
}

impl<A, V, E> Clone for Options<A, V, E> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            max_age: self.max_age,
            cache_key: Arc::clone(&self.cache_key),
            value_accept: self.value_accept.clone(),
            cache_handles_expiration: self.cache_handles_expiration,
        }
    }
}

impl<A, V, E> fmt::Debug for Options<A, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("max_age", &self.max_age)
            .field("value_accept", &self.value_accept.is_some())
            .field("cache_handles_expiration", &self.cache_handles_expiration)
            .finish_non_exhaustive()
    }
}
