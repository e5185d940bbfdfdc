//! Tagged Cache Module
//!
//! Combines the TTL store with the tag index. Every method that removes an
//! entry, including lazy expiration, prunes that entry's tags in the same
//! call, so the index only ever names live keys.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheStats, Expiry, TagIndex, TtlStore};
use crate::config::CacheConfig;

/// A tagged cache shared between tasks.
///
/// Hold the write guard for the duration of one operation; every operation
/// then observes the store and the index together.
pub type SharedCache<V> = Arc<RwLock<TagCache<V>>>;

// == Tagged Payload ==
/// What the store holds for each key: the caller's value plus its tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagged<V> {
    pub value: V,
    pub tags: HashSet<String>,
}

// == Cache Item ==
/// One entry of a batch `mset`.
#[derive(Debug, Clone)]
pub struct CacheItem<V> {
    pub key: CacheKey,
    pub value: V,
    pub ttl: Option<u64>,
    pub tags: Vec<String>,
}

impl<V> CacheItem<V> {
    /// Creates an untagged item using the cache's default TTL.
    pub fn new(key: impl Into<CacheKey>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
            ttl: None,
            tags: Vec::new(),
        }
    }

    /// Sets the TTL in seconds (0 = never expire).
    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the item's tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

// == Tag Cache ==
/// TTL cache with tag-based bulk invalidation.
///
/// Values are returned as clones; the cache keeps the only stored copy.
///
/// # Example
/// ```
/// use tagged_cache::TagCache;
///
/// let mut cache = TagCache::new(0);
/// cache.set("user:1", "alice".to_string(), Some(60), &["users"]);
/// cache.set("user:2", "bob".to_string(), Some(60), &["users", "admins"]);
///
/// assert_eq!(cache.invalidate_tag("admins"), 1);
/// assert_eq!(cache.get("user:1"), Some("alice".to_string()));
/// assert_eq!(cache.get("user:2"), None);
/// ```
#[derive(Debug)]
pub struct TagCache<V> {
    store: TtlStore<Tagged<V>>,
    index: TagIndex,
}

impl<V: Clone> TagCache<V> {
    // == Constructors ==
    /// Creates a cache whose entries default to `default_ttl` seconds (0 = never expire).
    pub fn new(default_ttl: u64) -> Self {
        Self::with_store(TtlStore::new(default_ttl))
    }

    /// Creates a cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_store(TtlStore::from_config(config))
    }

    /// Wraps an existing, empty store.
    pub fn with_store(store: TtlStore<Tagged<V>>) -> Self {
        Self {
            store,
            index: TagIndex::new(),
        }
    }

    /// Moves the cache behind an `Arc<RwLock<_>>` for sharing.
    pub fn into_shared(self) -> SharedCache<V> {
        Arc::new(RwLock::new(self))
    }

    // == Set ==
    /// Stores `value` under `key` with optional TTL and tags.
    ///
    /// Setting an existing key replaces its value, TTL and tags; the key is
    /// detached from tags it no longer carries. Returns false if the store
    /// rejects the entry, in which case nothing changes.
    ///
    /// # Arguments
    /// * `key` - String or integer key
    /// * `value` - The value to store
    /// * `ttl` - TTL in seconds (default TTL if None, 0 = never expire)
    /// * `tags` - Tags to file the key under
    pub fn set(
        &mut self,
        key: impl Into<CacheKey>,
        value: V,
        ttl: Option<u64>,
        tags: &[&str],
    ) -> bool {
        let tags = tags.iter().map(|tag| tag.to_string()).collect();
        self.insert(key.into(), value, ttl, tags)
    }

    /// Stores every item independently; one rejection does not affect the others.
    pub fn mset(&mut self, items: impl IntoIterator<Item = CacheItem<V>>) -> Vec<bool> {
        items
            .into_iter()
            .map(|item| {
                let tags = item.tags.into_iter().collect();
                self.insert(item.key, item.value, item.ttl, tags)
            })
            .collect()
    }

    fn insert(&mut self, key: CacheKey, value: V, ttl: Option<u64>, tags: HashSet<String>) -> bool {
        if self.store.at_capacity(&key) {
            self.purge_expired();
        }

        let payload = Tagged {
            value,
            tags: tags.clone(),
        };

        match self.store.set(key.clone(), payload, ttl) {
            Ok(previous) => {
                if let Some(previous) = previous {
                    self.index.detach(&key, &previous.tags);
                }
                self.index.attach(&key, &tags);
                true
            }
            Err(err) => {
                warn!("Rejected set for key '{}': {}", key, err);
                false
            }
        }
    }

    // == Get ==
    /// Returns a clone of the value under `key`, or None if absent or expired.
    pub fn get(&mut self, key: impl Into<CacheKey>) -> Option<V> {
        let key = key.into();
        self.expire_key(&key);
        self.store.get(&key).map(|tagged| tagged.value.clone())
    }

    /// Looks up every key; results are in input order.
    pub fn mget<K: Into<CacheKey>>(&mut self, keys: impl IntoIterator<Item = K>) -> Vec<Option<V>> {
        keys.into_iter().map(|key| self.get(key)).collect()
    }

    // == Delete ==
    /// Deletes one key. Returns 1 if a live entry was removed, else 0.
    pub fn del(&mut self, key: impl Into<CacheKey>) -> usize {
        self.mdel(std::iter::once(key.into()))
    }

    /// Deletes every listed key.
    ///
    /// Returns the number of live entries removed from the store.
    pub fn mdel<K: Into<CacheKey>>(&mut self, keys: impl IntoIterator<Item = K>) -> usize {
        let mut removed = 0;
        for key in keys {
            if self.remove_key(&key.into()) {
                removed += 1;
            }
        }
        removed
    }

    /// Removes and returns the value under `key`.
    pub fn take(&mut self, key: impl Into<CacheKey>) -> Option<V> {
        let key = key.into();
        self.expire_key(&key);

        let tagged = self.store.take(&key)?;
        self.index.detach(&key, &tagged.tags);
        Some(tagged.value)
    }

    // == Invalidation ==
    /// Deletes every key carrying `tag`.
    ///
    /// Returns the number of live entries removed.
    pub fn invalidate_tag(&mut self, tag: &str) -> usize {
        let keys = self.index.keys_for_tag(tag);
        if keys.is_empty() {
            return 0;
        }

        let removed = self.mdel(keys);
        debug!("Invalidated tag '{}': removed {} entries", tag, removed);
        removed
    }

    /// Deletes every key carrying all of `tags`.
    ///
    /// A tag unknown to the index empties the intersection, as does an
    /// empty tag list.
    pub fn invalidate_tags_intersection<S: AsRef<str>>(&mut self, tags: &[S]) -> usize {
        let keys = self.index.intersection(tags);
        if keys.is_empty() {
            return 0;
        }

        let removed = self.mdel(keys);
        debug!(
            "Invalidated intersection of {} tags: removed {} entries",
            tags.len(),
            removed
        );
        removed
    }

    /// Deletes every key carrying any of `tags`.
    pub fn invalidate_tags_union<S: AsRef<str>>(&mut self, tags: &[S]) -> usize {
        let keys = self.index.union(tags);
        if keys.is_empty() {
            return 0;
        }

        let removed = self.mdel(keys);
        debug!(
            "Invalidated union of {} tags: removed {} entries",
            tags.len(),
            removed
        );
        removed
    }

    /// Removes every entry and every tag.
    pub fn flush_all(&mut self) {
        self.store.flush_all();
        self.index.clear();
    }

    // == Store Pass-through ==
    /// Every live key, in no particular order.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.store.keys()
    }

    /// Returns true if `key` holds a live entry.
    pub fn has(&self, key: impl Into<CacheKey>) -> bool {
        self.store.has(&key.into())
    }

    /// Redefines the TTL of a live key (default TTL if None, 0 = never expire).
    pub fn ttl(&mut self, key: impl Into<CacheKey>, ttl: Option<u64>) -> bool {
        let key = key.into();
        self.expire_key(&key);
        self.store.ttl(&key, ttl)
    }

    /// When the entry under `key` expires, or None if there is no live entry.
    pub fn get_ttl(&self, key: impl Into<CacheKey>) -> Option<Expiry> {
        self.store.expiry(&key.into())
    }

    /// Hit and miss counters plus the live key count.
    pub fn get_stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Zeroes the hit and miss counters.
    pub fn flush_stats(&mut self) {
        self.store.flush_stats();
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if no live entry remains.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // == Introspection ==
    /// Read-only view of the tag index, for debugging.
    ///
    /// Expired entries are purged first so every listed key is live.
    pub fn tag_map(&mut self) -> &HashMap<String, HashSet<CacheKey>> {
        self.purge_expired();
        self.index.as_map()
    }

    /// Live keys currently carrying `tag`.
    pub fn keys_for_tag(&mut self, tag: &str) -> HashSet<CacheKey> {
        self.purge_expired();
        self.index.keys_for_tag(tag)
    }

    /// Tags recorded on the live entry under `key`.
    pub fn tags_for_key(&self, key: impl Into<CacheKey>) -> Option<&HashSet<String>> {
        self.store.peek(&key.into()).map(|tagged| &tagged.tags)
    }

    // == Expiration ==
    /// Physically removes every expired entry and prunes its tags.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let expired = self.store.purge_expired();
        for (key, tagged) in &expired {
            self.index.detach(key, &tagged.tags);
        }
        expired.len()
    }

    fn expire_key(&mut self, key: &CacheKey) {
        if let Some(tagged) = self.store.evict_expired(key) {
            self.index.detach(key, &tagged.tags);
        }
    }

    fn remove_key(&mut self, key: &CacheKey) -> bool {
        if let Some(expired) = self.store.evict_expired(key) {
            self.index.detach(key, &expired.tags);
            return false;
        }

        match self.store.remove(key) {
            Some(tagged) => {
                self.index.detach(key, &tagged.tags);
                true
            }
            None => {
                self.index.detach_all(key);
                false
            }
        }
    }
}

impl<V: Clone> Default for TagCache<V> {
    fn default() -> Self {
        Self::new(0)
    }
}
