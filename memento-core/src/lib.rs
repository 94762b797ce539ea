//! # Memento Core
//!
//! Core types for the memento memoization library.
//!
//! A memoized function wraps a plain function together with a [`Cache`] and
//! answers repeated calls with the same arguments from that cache.
//!
//! ## Features
//!
//! - **Pluggable caches**: anything implementing the [`Cache`] contract; bulk
//!   removal is an optional capability probed at call time
//! - **Sync and async lookups**: a cache may answer its existence check
//!   immediately or through a future ([`Presence`]); calls adapt ([`Outcome`])
//! - **Eventual results**: [`memoize_async`] caches resolved values and never
//!   caches rejections
//! - **Expiration**: scheduled by the memoizer or delegated to the cache
//! - **Conditional caching**: an acceptance predicate gates every store
//! - **Invalidation**: per-argument `delete` and whole-cache `clear`
//! - **Statistics**: hit/miss/store counters (with the `stats` feature)
//!
//! ## Module Organization
//!
//! - [`keys`] - default cache key derivation from argument tuples
//! - `utils` - background timers and deferred stores (internal)
//!
//! ## Quick Start
//!
//! ```
//! use memento_core::{memoize, Options};
//! use std::time::Duration;
//!
//! let slow_square = memoize(
//!     |(x,): (u64,)| x * x,
//!     Options::default().with_max_age(Duration::from_secs(60)),
//! );
//!
//! assert_eq!(slow_square.call((12,)).ready(), Some(144));
//! assert_eq!(slow_square.call((12,)).ready(), Some(144));
//! ```
mod async_memoize;
mod cache;
mod cache_entry;
mod error;
mod memoize;
mod memory_cache;
mod options;

pub mod keys;
pub(crate) mod utils;

#[cfg(feature = "stats")]
mod stats;

pub use async_memoize::{memoize_async, AsyncMemoized};
pub use cache::{Cache, Clear, Presence};
pub use cache_entry::CacheEntry;
pub use error::{MemoizeError, Result};
pub use keys::{CacheKeyArgs, CacheableKey, NO_ARGS_KEY};
pub use memoize::{memoize, Memoized, Outcome};
pub use memory_cache::MemoryCache;
pub use options::{CacheFactory, KeyFn, Options, ValueAccept};

#[cfg(feature = "stats")]
pub use stats::CacheStats;
