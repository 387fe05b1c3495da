//! Depth-indexed tree snapshots.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::fs::entry::Entry;

/// A traversal result: depth → entries recorded at that depth.
///
/// Depth keys come from an ordered map, so iteration is always shallowest
/// first. Within a bucket, entries keep the order in which they were
/// appended. Buckets are never empty; a depth at which nothing was recorded
/// has no key at all.
///
/// The tree owns its [`Entry`] values. Parent links are not checked on
/// insertion; see [`crate::tree::hierarchy::Hierarchy::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthTree {
    buckets: BTreeMap<usize, Vec<Entry>>,
}

impl DepthTree {
    /// Creates a tree holding only `root`, at `root_depth`.
    pub fn new(root: Entry, root_depth: usize) -> Self {
        let mut buckets = BTreeMap::new();
        buckets.insert(root_depth, vec![root]);
        Self { buckets }
    }

    /// Appends `entries` to the bucket at `depth`. Empty input creates no bucket.
    pub fn extend(&mut self, depth: usize, entries: impl IntoIterator<Item = Entry>) {
        let mut entries = entries.into_iter().peekable();
        if entries.peek().is_none() {
            return;
        }
        self.buckets.entry(depth).or_default().extend(entries);
    }

    /// Entries recorded at `depth`, if any.
    pub fn bucket(&self, depth: usize) -> Option<&[Entry]> {
        self.buckets.get(&depth).map(Vec::as_slice)
    }

    /// Populated depths, shallowest first.
    pub fn depths(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets.keys().copied()
    }

    /// Iterates over `(depth, bucket)` pairs, shallowest first.
    pub fn buckets(&self) -> btree_map::Iter<'_, usize, Vec<Entry>> {
        self.buckets.iter()
    }

    /// The lowest populated depth.
    pub fn root_depth(&self) -> Option<usize> {
        self.buckets.keys().next().copied()
    }

    /// The first entry at the lowest populated depth.
    pub fn root(&self) -> Option<&Entry> {
        self.buckets.values().next().and_then(|bucket| bucket.first())
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// All entries, shallowest bucket first, bucket order preserved.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.buckets.values().flatten()
    }

    /// Flattens every bucket and reverses the result.
    ///
    /// Every entry at depth *d + 1* comes before every entry at depth *d*, so
    /// a directory always follows everything that was recorded inside it.
    pub fn into_deletion_order(self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self.buckets.into_values().flatten().collect();
        entries.reverse();
        entries
    }
}

impl<'a> IntoIterator for &'a DepthTree {
    type Item = &'a Entry;
    type IntoIter = std::iter::Flatten<btree_map::Values<'a, usize, Vec<Entry>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.values().flatten()
    }
}
