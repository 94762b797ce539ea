//! Cache key derivation.
//!
//! Memoized functions receive their arguments as a single tuple. The default
//! key of a call is built from that tuple:
//!
//! - `()` maps to the fixed [`NO_ARGS_KEY`], so every zero-argument call
//!   shares one entry.
//! - Any other tuple renders each argument with [`CacheableKey`] and joins
//!   the parts with `|` inside parentheses.
//!
//! The rendering goes through `Debug`, which is deep, keeps argument order
//! and distinguishes types that print alike (`1` versus `"1"`). Types whose
//! `Debug` output is not stable, such as `HashMap`, should be keyed with a
//! custom function instead (see [`Options::with_cache_key`](crate::Options::with_cache_key)).
//!
//! ```
//! use memento_core::{CacheKeyArgs, NO_ARGS_KEY};
//!
//! assert_eq!(().cache_key(), NO_ARGS_KEY);
//! assert_eq!((1, "a").cache_key(), (1, "a").cache_key());
//! assert_ne!((1, "a").cache_key(), ("1", "a").cache_key());
//! ```

use std::fmt::Debug;

/// Key shared by every call made without arguments.
pub const NO_ARGS_KEY: &str = "#no-args";

/// Trait for values that can render themselves as part of a cache key.
pub trait CacheableKey {
    fn to_cache_key(&self) -> String;
}

impl<T> CacheableKey for T
where
    T: Debug + ?Sized,
{
    fn to_cache_key(&self) -> String {
        format!("{:?}", self)
    }
}

/// Trait for argument tuples that derive a default cache key.
pub trait CacheKeyArgs {
    fn cache_key(&self) -> String;
}

impl CacheKeyArgs for () {
    fn cache_key(&self) -> String {
        NO_ARGS_KEY.to_string()
    }
}

macro_rules! impl_cache_key_args {
    ($($name:ident $idx:tt),+) => {
        impl<$($name: CacheableKey),+> CacheKeyArgs for ($($name,)+) {
            fn cache_key(&self) -> String {
                let parts = [$(self.$idx.to_cache_key()),+];
                format!("({})", parts.join("|"))
            }
        }
    };
}

impl_cache_key_args!(A0 0);
impl_cache_key_args!(A0 0, A1 1);
impl_cache_key_args!(A0 0, A1 1, A2 2);
impl_cache_key_args!(A0 0, A1 1, A2 2, A3 3);
impl_cache_key_args!(A0 0, A1 1, A2 2, A3 3, A4 4);
impl_cache_key_args!(A0 0, A1 1, A2 2, A3 3, A4 4, A5 5);
impl_cache_key_args!(A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6);
impl_cache_key_args!(A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6, A7 7);
impl_cache_key_args!(A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6, A7 7, A8 8);
impl_cache_key_args!(A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6, A7 7, A8 8, A9 9);
impl_cache_key_args!(A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6, A7 7, A8 8, A9 9, A10 10);
impl_cache_key_args!(A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6, A7 7, A8 8, A9 9, A10 10, A11 11);
