use crate::cache::{Cache, Presence};
use crate::error::Result;
use crate::memoize::MemoCore;
use crate::options::{Options, ValueAccept};
use crate::utils;
#[cfg(feature = "stats")]
use crate::CacheStats;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A memoized function returning eventual results.
///
/// The wrapped function returns a future resolving to `Result<T, E>`: `Ok`
/// is a resolved value, `Err` a rejection. Only resolved values can be
/// cached; a rejection is always handed back to the caller and never stored.
///
/// Created by [`memoize_async`]. Clones share the same cache.
pub struct AsyncMemoized<A, T, E> {
    core: Arc<MemoCore<A, T>>,
    func: Arc<dyn Fn(A) -> BoxFuture<'static, std::result::Result<T, E>> + Send + Sync>,
    value_accept: Option<ValueAccept<T, E>>,
}

/// Wraps an async `func` so that its resolved values are cached by argument tuple.
///
/// On a miss the wrapped function is invoked right away and its future is
/// shared between the caller and a detached storage task. The storage task
/// waits for the result, asks the acceptance predicate (if any) and stores
/// accepted values. Storage therefore happens even if the caller never awaits
/// the returned future, and a panicking predicate only takes down the storage
/// task.
///
/// Without a predicate every `Ok` value is stored and every `Err` is
/// discarded.
///
/// # Examples
///
/// ```
/// use memento_core::{memoize_async, Options};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let fetch = memoize_async(
///     |(id,): (u64,)| async move {
///         if id == 0 {
///             Err("no such user".to_string())
///         } else {
///             Ok(format!("user-{}", id))
///         }
///     },
///     Options::default(),
/// );
///
/// assert_eq!(fetch.call((7,)).await, Ok("user-7".to_string()));
/// assert!(fetch.call((0,)).await.is_err());
/// # }
/// ```
pub fn memoize_async<A, T, E, F, Fut>(func: F, options: Options<A, T, E>) -> AsyncMemoized<A, T, E>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
{
    AsyncMemoized {
        core: Arc::new(MemoCore::new(&options)),
        func: Arc::new(move |args: A| func(args).boxed()),
        value_accept: options.value_accept,
    }
}

impl<A, T, E> AsyncMemoized<A, T, E>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Calls the memoized function.
    ///
    /// When the cache answers its existence check immediately, a miss invokes
    /// the wrapped function before this method returns. When the check is
    /// pending, everything happens once the returned future is polled.
    pub fn call(&self, args: A) -> BoxFuture<'static, std::result::Result<T, E>> {
        let key = self.core.key(&args);
        match self.core.lookup(&key) {
            Presence::Known(found) => self.resolve(key, found, args),
            Presence::Pending(lookup) => {
                let this = self.clone();
                async move {
                    let found = lookup.await;
                    this.resolve(key, found, args).await
                }
                .boxed()
            }
        }
    }

    fn resolve(
        &self,
        key: String,
        found: bool,
        args: A,
    ) -> BoxFuture<'static, std::result::Result<T, E>> {
        if let Some(value) = self.core.cached(&key, found) {
            return future::ready(Ok(value)).boxed();
        }

        let result = (self.func)(args).shared();
        let settled = result.clone();
        let core = Arc::clone(&self.core);
        let value_accept = self.value_accept.clone();
        utils::spawn_detached(async move {
            let outcome = settled.await;
            let accepted = match &value_accept {
                Some(accept) => accept(outcome.as_ref()),
                None => outcome.is_ok(),
            };
            match outcome {
                Ok(value) if accepted => core.store(key, value),
                _ => core.reject(&key),
            }
        });
        result.boxed()
    }

    /// Removes the entry cached for `args`. Returns whether one was present.
    pub fn delete(&self, args: &A) -> bool {
        self.core.delete(args)
    }

    /// Removes every cached entry.
    ///
    /// Fails with [`MemoizeError::Unsupported`](crate::MemoizeError::Unsupported)
    /// when the cache has no bulk removal.
    pub fn clear(&self) -> Result<()> {
        self.core.clear()
    }

    pub fn cache(&self) -> &Arc<dyn Cache<T>> {
        self.core.cache()
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        self.core.stats()
    }
}

impl<A, T, E> Clone for AsyncMemoized<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            func: Arc::clone(&self.func),
            value_accept: self.value_accept.clone(),
        }
    }
}

impl<A, T, E> fmt::Debug for AsyncMemoized<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncMemoized").finish_non_exhaustive()
    }
}
