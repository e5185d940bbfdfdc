//! Tagged Cache - An in-process TTL cache with tag-based invalidation
//!
//! Entries expire after a time-to-live and can be filed under any number of
//! tags. A whole class of entries can then be dropped by a single tag, by
//! the intersection of several tags, or by their union.
//!
//! ```
//! use tagged_cache::TagCache;
//!
//! let mut cache = TagCache::new(0);
//! cache.set("a", 1, Some(60), &["A"]);
//! cache.set("b", 2, Some(60), &["B"]);
//! cache.set("ab", 3, Some(60), &["A", "B"]);
//!
//! assert_eq!(cache.invalidate_tags_intersection(&["A", "B"]), 1);
//! assert_eq!(cache.mget(["a", "b", "ab"]), vec![Some(1), Some(2), None]);
//!
//! assert_eq!(cache.invalidate_tags_union(&["A", "B"]), 2);
//! assert!(cache.keys().is_empty());
//! ```

pub mod cache;
pub mod config;
pub mod defaults;
pub mod error;
pub mod memo;
pub mod tasks;

pub use cache::{CacheItem, CacheKey, CacheStats, Expiry, SharedCache, TagCache};
pub use config::CacheConfig;
pub use defaults::{configure_default_cache, default_cache};
pub use error::CacheError;
pub use memo::{cached_call, MemoOptions, Memoized};
pub use tasks::spawn_cleanup_task;
