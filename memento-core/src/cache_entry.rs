use std::time::Duration;
use tokio::time::Instant;

/// Value stored by [`MemoryCache`](crate::MemoryCache), stamped with its insertion time.
///
/// The optional `max_age` is the lifetime the memoized function asked the
/// cache to enforce. Timestamps come from `tokio::time::Instant`, which
/// follows the runtime clock (and therefore paused test clocks) when a runtime
/// is active and the system monotonic clock otherwise.
///
/// # Examples
///
/// ```
/// use memento_core::CacheEntry;
/// use std::time::Duration;
///
/// let entry = CacheEntry::new(42, Some(Duration::from_secs(60)));
/// assert_eq!(entry.value, 42);
/// assert!(!entry.is_expired());
///
/// let forever = CacheEntry::new("data", None);
/// assert!(!forever.is_expired());
/// ```
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: Instant,
    pub max_age: Option<Duration>,
}

impl<V> CacheEntry<V> {
    /// Creates a new entry stamped with the current time.
    pub fn new(value: V, max_age: Option<Duration>) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            max_age,
        }
    }

    /// Returns true once the entry is at least `max_age` old.
    ///
    /// Entries without `max_age` never expire.
    pub fn is_expired(&self) -> bool {
        match self.max_age {
            Some(max_age) => self.inserted_at.elapsed() >= max_age,
            None => false,
        }
    }
}
