//! In-memory key to offset mapping
//!
//! Backed by a `BTreeMap`, so iteration (and therefore the persisted
//! entry order) is ascending by key.

use std::collections::btree_map;
use std::collections::BTreeMap;

/// Byte offset of a frame's length prefix within the store file
pub type StoreOffset = u64;

/// Exact-match index from natural key to frame offset.
///
/// Once loaded it is only read; rebuilds produce a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetIndex {
    entries: BTreeMap<String, StoreOffset>,
}

impl OffsetIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the offset for `key`.
    ///
    /// Returns the offset it replaced, if any.
    pub fn insert(&mut self, key: impl Into<String>, offset: StoreOffset) -> Option<StoreOffset> {
        self.entries.insert(key.into(), offset)
    }

    /// Exact-match lookup. `None` means the key is not indexed.
    pub fn find_offset(&self, key: &str) -> Option<StoreOffset> {
        self.entries.get(key).copied()
    }

    /// Returns whether `key` is indexed
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }
}

/// Iterator over `(key, offset)` pairs in key order
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, StoreOffset>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, StoreOffset);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), *v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a OffsetIndex {
    type Item = (&'a str, StoreOffset);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, StoreOffset)> for OffsetIndex {
    fn from_iter<I: IntoIterator<Item = (K, StoreOffset)>>(iter: I) -> Self {
        let mut index = OffsetIndex::new();
        for (key, offset) in iter {
            index.insert(key, offset);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_offset_exact_match_only() {
        let index: OffsetIndex = [("00501", 20u64), ("00601", 70)].into_iter().collect();

        assert_eq!(index.find_offset("00601"), Some(70));
        assert_eq!(index.find_offset("0060"), None);
        assert_eq!(index.find_offset("00601 "), None);
        assert_eq!(index.find_offset(""), None);
    }

    #[test]
    fn test_huge_offset_is_not_absence() {
        let mut index = OffsetIndex::new();
        index.insert("99999", u64::MAX);
        assert_eq!(index.find_offset("99999"), Some(u64::MAX));
        assert_eq!(index.find_offset("00000"), None);
    }

    #[test]
    fn test_insert_replaces() {
        let mut index = OffsetIndex::new();
        assert_eq!(index.insert("00501", 10), None);
        assert_eq!(index.insert("00501", 99), Some(10));
        assert_eq!(index.len(), 1);
        assert_eq!(index.find_offset("00501"), Some(99));
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let index: OffsetIndex = [("99950", 3u64), ("00501", 1), ("00601", 2)]
            .into_iter()
            .collect();
        let keys: Vec<&str> = index.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["00501", "00601", "99950"]);
        assert_eq!(index.iter().len(), 3);
    }
}
