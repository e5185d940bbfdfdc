//! Tag Index Module
//!
//! Maps each tag to the set of keys currently carrying it. The index holds
//! key memberships only, never values, and never keeps a tag whose key set
//! is empty.

use std::collections::{HashMap, HashSet};

use crate::cache::CacheKey;

// == Tag Index ==
/// Tag to key-set mapping kept in step with the store.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagIndex {
    tags: HashMap<String, HashSet<CacheKey>>,
}

impl TagIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an index from `(key, tags)` pairs of live entries.
    pub fn from_entries<'a, I, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a CacheKey, T)>,
        T: IntoIterator<Item = &'a String>,
    {
        let mut index = Self::new();
        for (key, tags) in entries {
            index.attach(key, tags);
        }
        index
    }

    // == Attach ==
    /// Adds `key` to the key set of every tag, creating sets as needed.
    pub fn attach<'a, T>(&mut self, key: &CacheKey, tags: T)
    where
        T: IntoIterator<Item = &'a String>,
    {
        for tag in tags {
            self.tags
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
        }
    }

    // == Detach ==
    /// Removes `key` from the key set of every listed tag.
    ///
    /// Tags left with no keys are dropped.
    pub fn detach<'a, T>(&mut self, key: &CacheKey, tags: T)
    where
        T: IntoIterator<Item = &'a String>,
    {
        for tag in tags {
            if let Some(keys) = self.tags.get_mut(tag.as_str()) {
                if keys.remove(key) && keys.is_empty() {
                    self.tags.remove(tag.as_str());
                }
            }
        }
    }

    /// Removes `key` from every tag it appears under.
    ///
    /// Scans the whole index; use `detach` when the key's tags are known.
    pub fn detach_all(&mut self, key: &CacheKey) {
        self.tags.retain(|_, keys| {
            keys.remove(key);
            !keys.is_empty()
        });
    }

    // == Lookup ==
    /// Returns the keys carrying `tag` (empty if the tag is unknown).
    pub fn keys_for_tag(&self, tag: &str) -> HashSet<CacheKey> {
        self.tags.get(tag).cloned().unwrap_or_default()
    }

    /// Returns true if `tag` has at least one key.
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    // == Set Algebra ==
    /// Keys carrying every listed tag.
    ///
    /// An unknown tag, or an empty tag list, yields an empty set.
    pub fn intersection<S: AsRef<str>>(&self, tags: &[S]) -> HashSet<CacheKey> {
        let mut sets = Vec::with_capacity(tags.len());
        for tag in tags {
            match self.tags.get(tag.as_ref()) {
                Some(keys) => sets.push(keys),
                None => return HashSet::new(),
            }
        }

        // Start from the smallest set so the running intersection stays small
        sets.sort_by_key(|keys| keys.len());

        let mut sets = sets.into_iter();
        let mut result = match sets.next() {
            Some(first) => first.clone(),
            None => return HashSet::new(),
        };

        for keys in sets {
            result.retain(|key| keys.contains(key));
            if result.is_empty() {
                break;
            }
        }

        result
    }

    /// Keys carrying at least one of the listed tags.
    pub fn union<S: AsRef<str>>(&self, tags: &[S]) -> HashSet<CacheKey> {
        tags.iter()
            .filter_map(|tag| self.tags.get(tag.as_ref()))
            .flatten()
            .cloned()
            .collect()
    }

    /// Read-only view of the whole mapping.
    pub fn as_map(&self) -> &HashMap<String, HashSet<CacheKey>> {
        &self.tags
    }

    /// Drops every tag.
    pub fn clear(&mut self) {
        self.tags.clear();
    }

    /// Number of tags with at least one key.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if no tag is indexed.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn keyset(list: &[&str]) -> HashSet<CacheKey> {
        list.iter().map(|k| CacheKey::from(*k)).collect()
    }

    #[test]
    fn test_attach_creates_tags() {
        let mut index = TagIndex::new();
        index.attach(&CacheKey::from("k1"), &tags(&["a", "b"]));
        index.attach(&CacheKey::from("k2"), &tags(&["a"]));

        assert_eq!(index.len(), 2);
        assert_eq!(index.keys_for_tag("a"), keyset(&["k1", "k2"]));
        assert_eq!(index.keys_for_tag("b"), keyset(&["k1"]));
    }

    #[test]
    fn test_detach_prunes_empty_tags() {
        let mut index = TagIndex::new();
        let k1 = CacheKey::from("k1");
        index.attach(&k1, &tags(&["a", "b"]));
        index.attach(&CacheKey::from("k2"), &tags(&["a"]));

        index.detach(&k1, &tags(&["a", "b"]));

        assert!(!index.contains_tag("b"));
        assert_eq!(index.keys_for_tag("a"), keyset(&["k2"]));
    }

    #[test]
    fn test_detach_unknown_is_noop() {
        let mut index = TagIndex::new();
        index.attach(&CacheKey::from("k1"), &tags(&["a"]));

        index.detach(&CacheKey::from("other"), &tags(&["a", "zzz"]));

        assert_eq!(index.keys_for_tag("a"), keyset(&["k1"]));
    }

    #[test]
    fn test_detach_all_scans_every_tag() {
        let mut index = TagIndex::new();
        let k1 = CacheKey::from("k1");
        index.attach(&k1, &tags(&["a", "b", "c"]));
        index.attach(&CacheKey::from("k2"), &tags(&["c"]));

        index.detach_all(&k1);

        assert_eq!(index.len(), 1);
        assert_eq!(index.keys_for_tag("c"), keyset(&["k2"]));
    }

    #[test]
    fn test_keys_for_unknown_tag_is_empty() {
        let index = TagIndex::new();
        assert!(index.keys_for_tag("nope").is_empty());
    }

    #[test]
    fn test_intersection() {
        let mut index = TagIndex::new();
        index.attach(&CacheKey::from("a_only"), &tags(&["A"]));
        index.attach(&CacheKey::from("b_only"), &tags(&["B"]));
        index.attach(&CacheKey::from("both"), &tags(&["A", "B"]));

        assert_eq!(index.intersection(&["A", "B"]), keyset(&["both"]));
        assert_eq!(index.intersection(&["A"]), keyset(&["a_only", "both"]));
    }

    #[test]
    fn test_intersection_with_unknown_tag_is_empty() {
        let mut index = TagIndex::new();
        index.attach(&CacheKey::from("both"), &tags(&["A", "B"]));

        assert!(index.intersection(&["A", "missing"]).is_empty());
        assert!(index.intersection::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_union() {
        let mut index = TagIndex::new();
        index.attach(&CacheKey::from("z"), &tags(&["Z"]));
        index.attach(&CacheKey::from("y"), &tags(&["Y"]));
        index.attach(&CacheKey::from("zy"), &tags(&["Z", "Y"]));
        index.attach(&CacheKey::from("other"), &tags(&["X"]));

        assert_eq!(index.union(&["Z", "Y", "missing"]), keyset(&["z", "y", "zy"]));
        assert!(index.union::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_from_entries_matches_incremental() {
        let k1 = CacheKey::from("k1");
        let k2 = CacheKey::from(2);
        let t1 = tags(&["a", "b"]);
        let t2 = tags(&["b"]);

        let mut incremental = TagIndex::new();
        incremental.attach(&k1, &t1);
        incremental.attach(&k2, &t2);

        let rebuilt = TagIndex::from_entries(vec![(&k1, &t1), (&k2, &t2)]);
        assert_eq!(rebuilt, incremental);
    }

    #[test]
    fn test_clear() {
        let mut index = TagIndex::new();
        index.attach(&CacheKey::from("k1"), &tags(&["a"]));
        index.clear();
        assert!(index.is_empty());
    }
}
