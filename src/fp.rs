//! Configuration-first memoization.
//!
//! [`memoize`] takes the options alone and returns a reusable adapter that
//! wraps functions later, which suits building several memoized functions
//! from one configuration. Every wrapped function gets its own cache from the
//! configured factory.
//!
//! ```
//! use memento::fp;
//! use memento::Options;
//! use std::time::Duration;
//!
//! let short_lived = fp::memoize(Options::default().with_max_age(Duration::from_secs(5)));
//!
//! let double = short_lived.wrap(|(x,): (u32,)| x * 2);
//! let triple = short_lived.wrap(|(x,): (u32,)| x * 3);
//!
//! assert_eq!(double.call((2,)).ready(), Some(4));
//! assert_eq!(triple.call((2,)).ready(), Some(6));
//! ```

use memento_core::{AsyncMemoized, Memoized, Options};
use std::convert::Infallible;
use std::fmt;
use std::future::Future;

/// Options waiting for a function to memoize.
pub struct MemoizeWith<A, V, E = Infallible> {
    options: Options<A, V, E>,
}

impl<A, V, E> Clone for MemoizeWith<A, V, E> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
        }
    }
}

impl<A, V, E> fmt::Debug for MemoizeWith<A, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MemoizeWith").field(&self.options).finish()
    }
}

/// Captures `options` for later use.
pub fn memoize<A, V, E>(options: Options<A, V, E>) -> MemoizeWith<A, V, E> {
    MemoizeWith { options }
}

impl<A, V> MemoizeWith<A, V, Infallible>
where
    A: Send + 'static,
    V: Clone + Send + 'static,
{
    /// Memoizes `func`, same as [`memento_core::memoize`].
    pub fn wrap<F>(&self, func: F) -> Memoized<A, V>
    where
        F: Fn(A) -> V + Send + Sync + 'static,
    {
        memento_core::memoize(func, self.options.clone())
    }
}

impl<A, T, E> MemoizeWith<A, T, E>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Memoizes an async `func`, same as [`memento_core::memoize_async`].
    pub fn wrap_async<F, Fut>(&self, func: F) -> AsyncMemoized<A, T, E>
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        memento_core::memoize_async(func, self.options.clone())
    }
}

/// Options first, function second: `memoize_fn(options, f)` equals `memoize(f, options)`.
pub fn memoize_fn<A, V, F>(options: Options<A, V>, func: F) -> Memoized<A, V>
where
    A: Send + 'static,
    V: Clone + Send + 'static,
    F: Fn(A) -> V + Send + Sync + 'static,
{
    memoize(options).wrap(func)
}

/// Async counterpart of [`memoize_fn`].
pub fn memoize_async_fn<A, T, E, F, Fut>(
    options: Options<A, T, E>,
    func: F,
) -> AsyncMemoized<A, T, E>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    memoize(options).wrap_async(func)
}
