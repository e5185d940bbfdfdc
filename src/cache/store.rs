//! TTL Store Module
//!
//! Key-payload storage with per-entry expiration. Expired entries read as
//! absent on every path, whether or not a sweep has removed them yet.

use std::collections::HashMap;

use crate::cache::{CacheEntry, CacheKey, CacheStats, Expiry};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == TTL Store ==
/// Main payload storage with TTL support and hit/miss accounting.
#[derive(Debug)]
pub struct TtlStore<P> {
    /// Key-payload storage
    entries: HashMap<CacheKey, CacheEntry<P>>,
    /// Performance statistics
    stats: CacheStats,
    /// Default TTL in seconds for entries set without one (0 = never expire)
    default_ttl: u64,
    /// Maximum number of entries allowed, None = unlimited
    max_keys: Option<usize>,
}

impl<P> TtlStore<P> {
    // == Constructor ==
    /// Creates a new TtlStore with the given default TTL and no key limit.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL in seconds applied when `set` gets none (0 = never expire)
    pub fn new(default_ttl: u64) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
            max_keys: None,
        }
    }

    /// Creates a TtlStore from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.default_ttl).with_max_keys(config.max_keys)
    }

    /// Sets the maximum number of entries.
    pub fn with_max_keys(mut self, max_keys: Option<usize>) -> Self {
        self.max_keys = max_keys;
        self
    }

    /// Returns the default TTL in seconds.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    // == Set ==
    /// Stores a payload under `key`.
    ///
    /// If the key already exists, the payload is overwritten and its TTL reset.
    /// Returns the payload that was replaced, expired or not.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `payload` - The payload to store
    /// * `ttl` - TTL in seconds (uses default_ttl if None, 0 = never expire)
    pub fn set(&mut self, key: CacheKey, payload: P, ttl: Option<u64>) -> Result<Option<P>> {
        if self.at_capacity(&key) {
            return Err(CacheError::CacheFull(self.max_keys.unwrap_or_default()));
        }

        let entry = CacheEntry::new(payload, ttl.unwrap_or(self.default_ttl));
        let previous = self.entries.insert(key, entry).map(|old| old.payload);

        self.stats.set_keys(self.entries.len());

        Ok(previous)
    }

    /// Returns true if setting `key` would be refused for lack of room.
    ///
    /// Expired entries not yet purged still count toward the limit.
    pub fn at_capacity(&self, key: &CacheKey) -> bool {
        match self.max_keys {
            Some(max_keys) => !self.entries.contains_key(key) && self.entries.len() >= max_keys,
            None => false,
        }
    }

    // == Get ==
    /// Retrieves a payload by key.
    ///
    /// Expired entries are removed and counted as misses.
    pub fn get(&mut self, key: &CacheKey) -> Option<&P> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.stats.set_keys(self.entries.len());
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| &entry.payload)
    }

    // == Peek ==
    /// Reads a live payload without touching statistics.
    pub fn peek(&self, key: &CacheKey) -> Option<&P> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| &entry.payload)
    }

    // == Take ==
    /// Retrieves and removes a payload in one step.
    pub fn take(&mut self, key: &CacheKey) -> Option<P> {
        match self.remove(key) {
            Some(payload) => {
                self.stats.record_hit();
                Some(payload)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Remove ==
    /// Removes an entry, returning its payload only if it was still live.
    pub fn remove(&mut self, key: &CacheKey) -> Option<P> {
        let entry = self.entries.remove(key)?;
        self.stats.set_keys(self.entries.len());

        if entry.is_expired() {
            None
        } else {
            Some(entry.payload)
        }
    }

    // == Delete ==
    /// Removes every listed key.
    ///
    /// Returns the number of live entries removed.
    pub fn delete(&mut self, keys: &[CacheKey]) -> usize {
        keys.iter().filter(|key| self.remove(key).is_some()).count()
    }

    // == Has ==
    /// Returns true if `key` holds a live entry.
    pub fn has(&self, key: &CacheKey) -> bool {
        self.peek(key).is_some()
    }

    // == Keys ==
    /// Returns every live key, in no particular order.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == TTL ==
    /// Redefines the TTL of a live entry.
    ///
    /// Returns false if the key is absent or already expired.
    ///
    /// # Arguments
    /// * `key` - The key to update
    /// * `ttl` - New TTL in seconds (uses default_ttl if None, 0 = never expire)
    pub fn ttl(&mut self, key: &CacheKey, ttl: Option<u64>) -> bool {
        let ttl = ttl.unwrap_or(self.default_ttl);

        match self.entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.set_ttl(ttl);
                true
            }
            Some(_) => {
                self.entries.remove(key);
                self.stats.set_keys(self.entries.len());
                false
            }
            None => false,
        }
    }

    /// Returns when a live entry expires.
    pub fn expiry(&self, key: &CacheKey) -> Option<Expiry> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::expiry)
    }

    // == Evict Expired ==
    /// Removes `key` if it is present but expired, returning its payload.
    pub fn evict_expired(&mut self, key: &CacheKey) -> Option<P> {
        if !self.entries.get(key)?.is_expired() {
            return None;
        }

        let entry = self.entries.remove(key)?;
        self.stats.set_keys(self.entries.len());
        Some(entry.payload)
    }

    // == Purge Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the removed keys with their payloads.
    pub fn purge_expired(&mut self) -> Vec<(CacheKey, P)> {
        let expired_keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let removed = expired_keys
            .into_iter()
            .filter_map(|key| {
                let entry = self.entries.remove(&key)?;
                Some((key, entry.payload))
            })
            .collect();

        self.stats.set_keys(self.entries.len());
        removed
    }

    // == Flush ==
    /// Removes every entry and resets statistics.
    pub fn flush_all(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::new();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_keys(self.len());
        stats
    }

    /// Zeroes the hit and miss counters.
    pub fn flush_stats(&mut self) {
        self.stats.reset_counters();
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| !entry.is_expired())
            .count()
    }

    /// Returns true if the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn key(s: &str) -> CacheKey {
        CacheKey::from(s)
    }

    #[test]
    fn test_store_new() {
        let store: TtlStore<String> = TtlStore::new(0);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = TtlStore::new(0);

        store.set(key("key1"), "value1", None).unwrap();

        assert_eq!(store.get(&key("key1")), Some(&"value1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_set_returns_previous() {
        let mut store = TtlStore::new(0);

        assert_eq!(store.set(key("key1"), "value1", None).unwrap(), None);
        assert_eq!(store.set(key("key1"), "value2", None).unwrap(), Some("value1"));
        assert_eq!(store.get(&key("key1")), Some(&"value2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store: TtlStore<&str> = TtlStore::new(0);

        assert!(store.get(&key("nonexistent")).is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete_counts_removed() {
        let mut store = TtlStore::new(0);

        store.set(key("key1"), "value1", None).unwrap();
        store.set(key("key2"), "value2", None).unwrap();

        let removed = store.delete(&[key("key1"), key("key2"), key("missing")]);
        assert_eq!(removed, 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_take() {
        let mut store = TtlStore::new(0);

        store.set(key("key1"), "value1", None).unwrap();

        assert_eq!(store.take(&key("key1")), Some("value1"));
        assert_eq!(store.take(&key("key1")), None);
        assert!(!store.has(&key("key1")));

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = TtlStore::new(0);

        store.set(key("key1"), "value1", Some(1)).unwrap();
        assert!(store.get(&key("key1")).is_some());

        sleep(Duration::from_millis(1100));

        assert!(!store.has(&key("key1")));
        assert!(store.keys().is_empty());
        assert!(store.get(&key("key1")).is_none());
    }

    #[test]
    fn test_store_default_ttl_applies() {
        let mut store = TtlStore::new(60);

        store.set(key("key1"), "value1", None).unwrap();
        store.set(key("key2"), "value2", Some(0)).unwrap();

        assert!(matches!(store.expiry(&key("key1")), Some(Expiry::At(_))));
        assert_eq!(store.expiry(&key("key2")), Some(Expiry::Never));
        assert_eq!(store.expiry(&key("missing")), None);
    }

    #[test]
    fn test_store_redefine_ttl() {
        let mut store = TtlStore::new(0);

        store.set(key("key1"), "value1", Some(60)).unwrap();

        assert!(store.ttl(&key("key1"), Some(120)));
        assert!(!store.ttl(&key("missing"), Some(120)));

        match store.expiry(&key("key1")) {
            Some(Expiry::At(at)) => {
                assert!(at > chrono::Utc::now() + chrono::Duration::seconds(60));
            }
            other => panic!("unexpected expiry: {:?}", other),
        }
    }

    #[test]
    fn test_store_evict_expired_only_when_expired() {
        let mut store = TtlStore::new(0);

        store.set(key("short"), "a", Some(1)).unwrap();
        store.set(key("long"), "b", Some(60)).unwrap();

        assert_eq!(store.evict_expired(&key("short")), None);

        sleep(Duration::from_millis(1100));

        assert_eq!(store.evict_expired(&key("short")), Some("a"));
        assert_eq!(store.evict_expired(&key("long")), None);
        assert_eq!(store.evict_expired(&key("missing")), None);
    }

    #[test]
    fn test_store_purge_expired() {
        let mut store = TtlStore::new(0);

        store.set(key("key1"), "value1", Some(1)).unwrap();
        store.set(key("key2"), "value2", Some(10)).unwrap();

        sleep(Duration::from_millis(1100));

        let removed = store.purge_expired();
        assert_eq!(removed, vec![(key("key1"), "value1")]);
        assert_eq!(store.len(), 1);
        assert!(store.get(&key("key2")).is_some());
    }

    #[test]
    fn test_store_flush_all_resets_stats() {
        let mut store = TtlStore::new(0);

        store.set(key("key1"), "value1", None).unwrap();
        store.get(&key("key1"));
        store.flush_all();

        assert!(store.is_empty());
        assert_eq!(store.stats(), CacheStats::new());
    }

    #[test]
    fn test_store_flush_stats() {
        let mut store = TtlStore::new(0);

        store.set(key("key1"), "value1", None).unwrap();
        store.get(&key("key1"));
        store.get(&key("missing"));
        store.flush_stats();

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.keys, 1);
    }

    #[test]
    fn test_store_max_keys() {
        let mut store = TtlStore::new(0).with_max_keys(Some(2));

        store.set(key("key1"), "value1", None).unwrap();
        store.set(key("key2"), "value2", None).unwrap();

        let result = store.set(key("key3"), "value3", None);
        assert_eq!(result, Err(CacheError::CacheFull(2)));

        // Overwriting an existing key is still allowed at capacity
        assert!(store.set(key("key1"), "value1b", None).is_ok());
    }

    #[test]
    fn test_store_accepts_any_key() {
        let mut store = TtlStore::new(0);
        let long_key = key(&"k".repeat(300));

        store.set(long_key.clone(), "long", None).unwrap();
        store.set(key(""), "empty", None).unwrap();
        store.set(CacheKey::from(-5), "negative", None).unwrap();

        assert_eq!(store.get(&long_key), Some(&"long"));
        assert_eq!(store.get(&key("")), Some(&"empty"));
        assert_eq!(store.get(&CacheKey::from(-5)), Some(&"negative"));
    }
}
