//! Cache Module
//!
//! Provides an in-memory TTL store and a tag index kept consistent with it.

mod entry;
mod key;
mod stats;
mod store;
mod tag_index;
mod tagged;


// Re-export public types
pub use entry::{CacheEntry, Expiry};
pub use key::CacheKey;
pub use stats::CacheStats;
pub use store::TtlStore;
pub use tag_index::TagIndex;
pub use tagged::{CacheItem, SharedCache, TagCache, Tagged};
