//! Default Cache
//!
//! A process-wide cache of JSON values, created on first use with a 6-hour
//! default TTL and replaceable at any time. Code that can take a cache as a
//! parameter should do so instead.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::info;

use crate::cache::{SharedCache, TagCache};
use crate::config::{CacheConfig, DEFAULT_CACHE_TTL};

static DEFAULT_CACHE: Lazy<RwLock<SharedCache<Value>>> = Lazy::new(|| {
    let config = CacheConfig::default().with_default_ttl(DEFAULT_CACHE_TTL);
    RwLock::new(TagCache::from_config(&config).into_shared())
});

/// Returns the current default cache.
pub fn default_cache() -> SharedCache<Value> {
    DEFAULT_CACHE.read().clone()
}

/// Replaces the default cache with a fresh one built from `config`.
///
/// Handles obtained earlier keep pointing at the previous cache.
pub fn configure_default_cache(config: &CacheConfig) -> SharedCache<Value> {
    let cache = TagCache::from_config(config).into_shared();
    *DEFAULT_CACHE.write() = cache.clone();

    info!(
        "Default cache reconfigured: default_ttl={}s, max_keys={:?}",
        config.default_ttl, config.max_keys
    );
    cache
}
