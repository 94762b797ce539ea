//! # Memento
//!
//! Function memoization over pluggable caches.
//!
//! ## Features
//!
//! - **Pluggable storage**: any type implementing [`Cache`] can back a memoized function
//! - **Expiration**: entries expire after a max age, scheduled by the memoizer or
//!   delegated to the cache
//! - **Conditional caching**: an acceptance predicate decides which results are stored,
//!   for plain values and for eventual (`async`) results alike
//! - **Eventual lookups**: caches may answer existence checks asynchronously
//! - **Invalidation**: delete single entries or clear everything
//! - **Statistics**: hit and miss counters behind the `stats` feature
//!
//! ## Quick Start
//!
//! ```rust
//! use memento::{memoize, Options};
//!
//! fn fibonacci(n: u64) -> u64 {
//!     if n <= 1 {
//!         return n;
//!     }
//!     fibonacci(n - 1) + fibonacci(n - 2)
//! }
//!
//! let fib = memoize(|(n,): (u64,)| fibonacci(n), Options::default());
//!
//! // First call computes the result
//! assert_eq!(fib.call((20,)).ready(), Some(6765));
//! // Second call returns the cached value
//! assert_eq!(fib.call((20,)).ready(), Some(6765));
//! ```
//!
//! Arguments are passed as a tuple; the cache key is derived from it. A
//! function without arguments takes `()` and is cached under
//! [`NO_ARGS_KEY`].
//!
//! ## Async functions
//!
//! ```rust
//! use memento::{memoize_async, Options};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let lookup = memoize_async(
//!     |(host,): (String,)| async move { Ok::<_, String>(host.len()) },
//!     Options::default(),
//! );
//!
//! assert_eq!(lookup.call(("example.org".to_string(),)).await, Ok(11));
//! # }
//! ```
//!
//! Only resolved values are cached. Rejections are returned to the caller and
//! the next call runs the function again.
//!
//! ## Configuration first
//!
//! The [`fp`] module takes the options before the function, so one
//! configuration can wrap many functions.

pub use memento_core::*;

pub mod fp;
