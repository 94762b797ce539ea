//! Error types for memoized functions.

use thiserror::Error;

/// Errors raised by the management operations of a memoized function.
///
/// Failures of the wrapped function itself never show up here: they are
/// returned to the caller exactly as the function produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoizeError {
    /// The underlying cache does not expose the capability the operation needs.
    #[error("unsupported operation: the cache does not support `{operation}`")]
    Unsupported { operation: &'static str },
}

/// Convenience result type for memoizer management operations.
pub type Result<T> = std::result::Result<T, MemoizeError>;
