//! Ordered collections backing the client configuration.
//!
//! Three pieces live here: [`DedupList`], an insertion-ordered sequence
//! that rejects structural duplicates; [`PriorityMap`], the priority-keyed
//! ordered multimap the filter pipeline dispatches from; and
//! [`MultiValueMap`], a case-insensitive string-keyed multimap used for
//! default headers.
//!
//! [`PriorityMap`] answers ceiling, successor and bounded-range queries.
//! It sits on a balanced ordered map (`BTreeMap`) rather than a hand-built
//! binary search tree, so sorted insertion order cannot degrade range
//! queries to linear scans; callers still get ascending key order, exact
//! boundary inclusivity, and empty iteration for empty or inverted
//! ranges.

use std::cmp::Ordering;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Insertion-ordered sequence whose `push` rejects an element equal to one
/// already present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupList<T> {
    items: Vec<T>,
}

impl<T: PartialEq> DedupList<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// One-element list, the unit every multimap merge starts from.
    pub fn of(item: T) -> Self {
        Self { items: vec![item] }
    }

    /// Appends `item` unless a structurally equal element is already
    /// stored. Returns whether the item was added.
    pub fn push(&mut self, item: T) -> bool {
        if self.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.iter().any(|existing| existing == item)
    }

    /// Appends every element of `other`, keeping the no-duplicate
    /// invariant.
    pub fn merge(&mut self, other: DedupList<T>) {
        for item in other.items {
            self.push(item);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Default for DedupList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<'a, T> IntoIterator for &'a DedupList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Priority-keyed ordered multimap.
///
/// Cloning performs a deep copy of the tree structure and every bucket
/// list, which is what the client snapshot relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityMap<K, V> {
    inner: BTreeMap<K, DedupList<V>>,
}

impl<K: Ord, V: PartialEq> PriorityMap<K, V> {
    pub fn new() -> Self {
        Self { inner: BTreeMap::new() }
    }

    /// Inserts or replaces the whole bucket at `key`, returning the
    /// previous bucket if one existed.
    pub fn set(&mut self, key: K, values: DedupList<V>) -> Option<DedupList<V>> {
        self.inner.insert(key, values)
    }

    /// Merges `value` into the bucket at `key`, keeping registration order
    /// and the no-duplicate invariant. Returns whether the value was
    /// added.
    pub fn put(&mut self, key: K, value: V) -> bool {
        self.inner.entry(key).or_default().push(value)
    }

    pub fn get(&self, key: &K) -> Option<&DedupList<V>> {
        self.inner.get(key)
    }

    /// Smallest entry with a key greater than or equal to `key`.
    pub fn ceiling_entry(&self, key: &K) -> Option<(&K, &DedupList<V>)> {
        self.inner.range((Bound::Included(key), Bound::Unbounded)).next()
    }

    /// Smallest entry with a key strictly greater than `key`, i.e. the
    /// in-order successor of that key.
    pub fn higher_entry(&self, key: &K) -> Option<(&K, &DedupList<V>)> {
        self.inner.range((Bound::Excluded(key), Bound::Unbounded)).next()
    }

    /// Ascending-order iteration over the entries whose key lies within
    /// the given bounds.
    ///
    /// An inverted range, or a single-key range that the inclusivity flags
    /// empty out, yields nothing; it never panics.
    pub fn sub_map(
        &self,
        from: K,
        to: K,
        from_inclusive: bool,
        to_inclusive: bool,
    ) -> impl Iterator<Item = (&K, &DedupList<V>)> {
        let empty = match from.cmp(&to) {
            Ordering::Greater => true,
            Ordering::Equal => !(from_inclusive && to_inclusive),
            Ordering::Less => false,
        };

        let range = if empty {
            None
        } else {
            let lower = if from_inclusive { Bound::Included(from) } else { Bound::Excluded(from) };
            let upper = if to_inclusive { Bound::Included(to) } else { Bound::Excluded(to) };
            Some(self.inner.range((lower, upper)))
        };

        range.into_iter().flatten()
    }

    /// Ascending-order iteration over every entry.
    pub fn iter(&self) -> btree_map::Iter<'_, K, DedupList<V>> {
        self.inner.iter()
    }

    pub fn first_entry(&self) -> Option<(&K, &DedupList<V>)> {
        self.inner.iter().next()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K: Ord, V: PartialEq> Default for PriorityMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity used to bucket values in a [`MultiValueMap`].
pub trait Keyed {
    /// Case-normalized bucket key.
    fn id(&self) -> String;
}

/// Case-insensitive string-keyed multimap with deduplicating buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiValueMap<T> {
    inner: BTreeMap<String, DedupList<T>>,
}

impl<T: Keyed + PartialEq> MultiValueMap<T> {
    pub fn new() -> Self {
        Self { inner: BTreeMap::new() }
    }

    /// Adds `item` to the bucket named by its [`Keyed::id`]. Returns
    /// whether the item was added (a structural duplicate is rejected).
    pub fn add(&mut self, item: T) -> bool {
        self.inner.entry(item.id()).or_default().push(item)
    }

    pub fn get(&self, key: &str) -> Option<&DedupList<T>> {
        self.inner.get(&key.to_ascii_lowercase())
    }

    /// Removes the whole bucket for `key`; reports whether one existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.inner.remove(&key.to_ascii_lowercase()).is_some()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &DedupList<T>)> {
        self.inner.iter().map(|(key, values)| (key.as_str(), values))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Keyed + PartialEq> Default for MultiValueMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_list_rejects_equal_elements() {
        let mut list = DedupList::new();
        assert!(list.push("a"));
        assert!(list.push("b"));
        assert!(!list.push("a"));
        assert_eq!(list.len(), 2);

        let collected: Vec<&&str> = list.iter().collect();
        assert_eq!(collected, [&"a", &"b"]);
    }

    #[test]
    fn dedup_list_merge_keeps_order_and_invariant() {
        let mut list = DedupList::of(1);
        let mut other = DedupList::new();
        other.push(1);
        other.push(2);
        other.push(3);

        list.merge(other);
        let collected: Vec<&i32> = list.iter().collect();
        assert_eq!(collected, [&1, &2, &3]);
    }

    #[test]
    fn set_replaces_and_returns_previous() {
        let mut map = PriorityMap::new();
        assert_eq!(map.set(1, DedupList::of("first")), None);

        let previous = map.set(1, DedupList::of("second")).unwrap();
        assert!(previous.contains(&"first"));
        assert!(map.get(&1).unwrap().contains(&"second"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn put_merges_in_registration_order() {
        let mut map = PriorityMap::new();
        assert!(map.put(5, "a"));
        assert!(map.put(5, "b"));
        assert!(!map.put(5, "a"));

        let bucket: Vec<&&str> = map.get(&5).unwrap().iter().collect();
        assert_eq!(bucket, [&"a", &"b"]);
    }

    #[test]
    fn ceiling_and_higher_entries() {
        let mut map = PriorityMap::new();
        map.put(-10, "pre");
        map.put(1, "decode");
        map.put(10, "log");

        assert_eq!(map.ceiling_entry(&1).map(|(k, _)| *k), Some(1));
        assert_eq!(map.higher_entry(&1).map(|(k, _)| *k), Some(10));
        assert_eq!(map.ceiling_entry(&0).map(|(k, _)| *k), Some(1));
        assert_eq!(map.higher_entry(&10), None);
        assert_eq!(map.ceiling_entry(&-100).map(|(k, _)| *k), Some(-10));
    }

    #[test]
    fn sub_map_splits_phases() {
        let mut map = PriorityMap::new();
        map.put(-10, "pre");
        map.put(1, "decode");
        map.put(10, "log");

        let pre: Vec<&&str> = map.sub_map(i32::MIN, 0, true, false).flat_map(|(_, b)| b.iter()).collect();
        assert_eq!(pre, [&"pre"]);

        let post: Vec<&&str> = map.sub_map(0, i32::MAX, true, true).flat_map(|(_, b)| b.iter()).collect();
        assert_eq!(post, [&"decode", &"log"]);
    }

    #[test]
    fn sub_map_respects_boundary_inclusivity() {
        let mut map = PriorityMap::new();
        map.put(0, "zero");
        map.put(5, "five");

        let keys: Vec<i32> = map.sub_map(0, 5, true, true).map(|(k, _)| *k).collect();
        assert_eq!(keys, [0, 5]);

        let keys: Vec<i32> = map.sub_map(0, 5, false, false).map(|(k, _)| *k).collect();
        assert!(keys.is_empty());
    }

    #[test]
    fn empty_half_open_range_yields_nothing() {
        let mut map = PriorityMap::new();
        map.put(5, "five");

        assert_eq!(map.sub_map(5, 5, true, false).count(), 0);
        assert_eq!(map.sub_map(5, 5, false, true).count(), 0);
        assert_eq!(map.sub_map(5, 5, true, true).count(), 1);
        assert_eq!(map.sub_map(7, 3, true, true).count(), 0);
    }

    #[test]
    fn empty_map_answers_every_query_with_nothing() {
        let map: PriorityMap<i32, &str> = PriorityMap::new();
        assert!(map.is_empty());
        assert_eq!(map.ceiling_entry(&0), None);
        assert_eq!(map.higher_entry(&0), None);
        assert_eq!(map.first_entry(), None);
        assert_eq!(map.sub_map(i32::MIN, i32::MAX, true, true).count(), 0);
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let mut map = PriorityMap::new();
        map.put(1, "a");

        let mut snapshot = map.clone();
        snapshot.put(1, "b");
        snapshot.put(2, "c");

        assert_eq!(map.get(&1).unwrap().len(), 1);
        assert_eq!(map.len(), 1);
        assert_eq!(snapshot.get(&1).unwrap().len(), 2);
        assert_eq!(snapshot.len(), 2);
    }

    struct Named(&'static str, &'static str);

    impl Keyed for Named {
        fn id(&self) -> String {
            self.0.to_ascii_lowercase()
        }
    }

    impl PartialEq for Named {
        fn eq(&self, other: &Self) -> bool {
            self.0.eq_ignore_ascii_case(other.0) && self.1 == other.1
        }
    }

    #[test]
    fn multi_value_map_is_case_insensitive() {
        let mut map = MultiValueMap::new();
        assert!(map.add(Named("Accept", "text/html")));
        assert!(map.add(Named("accept", "application/json")));
        assert!(!map.add(Named("ACCEPT", "text/html")));

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("aCCept").unwrap().len(), 2);

        assert!(map.remove("Accept"));
        assert!(!map.remove("Accept"));
        assert!(map.is_empty());
    }
}
