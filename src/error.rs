//! Error types for the cache
//!
//! The store reports why it rejected a write; the tagged cache folds these
//! into a `false` return.

use thiserror::Error;

// == Cache Error Enum ==
/// Reasons the store can refuse an entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key count limit reached and the key is not already present
    #[error("Cache full: max keys ({0}) reached")]
    CacheFull(usize),
}

// == Result Type Alias ==
/// Convenience Result type for store operations.
pub type Result<T> = std::result::Result<T, CacheError>;
