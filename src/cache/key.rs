//! Cache Key Module
//!
//! Keys are either strings or integers. The two never alias each other:
//! `CacheKey::Int(1)` and `CacheKey::Str("1")` are distinct entries.

use std::fmt;

use serde::Serialize;

// == Cache Key ==
/// A caller-supplied cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum CacheKey {
    /// Integer key
    Int(i64),
    /// String key
    Str(String),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Int(n) => write!(f, "{}", n),
            CacheKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        CacheKey::Str(key.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        CacheKey::Str(key)
    }
}

impl From<&String> for CacheKey {
    fn from(key: &String) -> Self {
        CacheKey::Str(key.clone())
    }
}

impl From<&CacheKey> for CacheKey {
    fn from(key: &CacheKey) -> Self {
        key.clone()
    }
}

impl From<i64> for CacheKey {
    fn from(key: i64) -> Self {
        CacheKey::Int(key)
    }
}

impl From<i32> for CacheKey {
    fn from(key: i32) -> Self {
        CacheKey::Int(i64::from(key))
    }
}

impl From<u32> for CacheKey {
    fn from(key: u32) -> Self {
        CacheKey::Int(i64::from(key))
    }
}
