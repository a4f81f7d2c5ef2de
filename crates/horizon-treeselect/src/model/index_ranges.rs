//! Sets of paths grouped by parent.

use std::collections::BTreeMap;
use std::fmt;

use super::index_path::IndexPath;
use super::index_range::{IndexRange, IndexRangeList};

/// A set of paths stored as range lists keyed by parent path.
///
/// Selecting the first hundred children of an item costs one map entry
/// holding one range. Keys with an empty list are never stored.
///
/// # Example
///
/// ```
/// use horizon_treeselect::model::{IndexPath, IndexRange, IndexRanges};
///
/// let mut ranges = IndexRanges::new();
/// ranges.add(&IndexPath::from([0, 1]));
/// ranges.add(&IndexPath::from([0, 2]));
/// ranges.add(&IndexPath::from([0, 0]));
///
/// let under = ranges.get(&IndexPath::from([0])).unwrap();
/// assert_eq!(under.ranges(), &[IndexRange::new(0, 2)]);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct IndexRanges {
    lists: BTreeMap<IndexPath, IndexRangeList>,
}

impl IndexRanges {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one path. Returns `true` if it was not present.
    ///
    /// The root path has no parent and is ignored.
    pub fn add(&mut self, path: &IndexPath) -> bool {
        match path.leaf() {
            Some(leaf) => !self.add_range(path.parent(), IndexRange::single(leaf)).is_empty(),
            None => false,
        }
    }

    /// Removes one path. Returns `true` if it was present.
    pub fn remove(&mut self, path: &IndexPath) -> bool {
        match path.leaf() {
            Some(leaf) => !self.remove_range(&path.parent(), IndexRange::single(leaf)).is_empty(),
            None => false,
        }
    }

    /// Adds a range of siblings under `parent`, returning the newly added parts.
    pub fn add_range(&mut self, parent: IndexPath, range: IndexRange) -> Vec<IndexRange> {
        self.lists.entry(parent).or_default().add(range)
    }

    /// Removes a range of siblings under `parent`, returning the parts that
    /// were present.
    pub fn remove_range(&mut self, parent: &IndexPath, range: IndexRange) -> Vec<IndexRange> {
        let Some(list) = self.lists.get_mut(parent) else {
            return Vec::new();
        };
        let removed = list.remove(range);
        if list.is_empty() {
            self.lists.remove(parent);
        }
        removed
    }

    /// Adds every range of `list` under `parent`.
    pub fn add_list(&mut self, parent: &IndexPath, list: &IndexRangeList) {
        if list.is_empty() {
            return;
        }
        let target = self.lists.entry(parent.clone()).or_default();
        for range in list {
            target.add(*range);
        }
    }

    /// Returns `true` if `path` is present.
    pub fn contains(&self, path: &IndexPath) -> bool {
        match path.leaf() {
            Some(leaf) => self
                .lists
                .get(&path.parent())
                .is_some_and(|list| list.contains(leaf)),
            None => false,
        }
    }

    /// The range list under `parent`, if any.
    pub fn get(&self, parent: &IndexPath) -> Option<&IndexRangeList> {
        self.lists.get(parent)
    }

    /// Iterates over `(parent, list)` pairs in document order of the parents.
    pub fn iter(&self) -> impl Iterator<Item = (&IndexPath, &IndexRangeList)> {
        self.lists.iter()
    }

    /// Returns `true` if no path is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Total number of paths.
    pub fn count(&self) -> usize {
        self.lists.values().map(IndexRangeList::count).sum()
    }

    /// Every path, in document order.
    pub fn paths(&self) -> Vec<IndexPath> {
        let mut paths: Vec<IndexPath> = self
            .lists
            .iter()
            .flat_map(|(parent, list)| list.indices().map(move |i| parent.clone_with_child_index(i)))
            .collect();
        // Parents interleave with their children's keys.
        paths.sort_unstable();
        paths
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.lists.clear();
    }

    /// Removes every path that descends from `ancestor`.
    pub fn clear_under(&mut self, ancestor: &IndexPath) {
        self.lists
            .retain(|parent, _| !parent.is_same_or_descendant_of(ancestor));
    }

    /// Removes the sibling window `[start, start + count)` under `parent`
    /// together with everything beneath it.
    pub fn remove_window(&mut self, parent: &IndexPath, start: usize, count: usize) {
        let Some(window) = IndexRange::with_count(start, count) else {
            return;
        };
        self.remove_range(parent, window);
        let depth = parent.len();
        self.lists.retain(|key, _| {
            !(parent.is_ancestor_of(key) && window.contains(key[depth]))
        });
    }

    /// Re-keys after siblings under `parent` moved by `delta` from `from`.
    ///
    /// Applies [`IndexRangeList::shift`] to the list at `parent` and moves
    /// every key beneath a shifted sibling. With a negative delta, keys under
    /// the vacated window are dropped.
    pub fn shift(&mut self, parent: &IndexPath, from: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        if let Some(list) = self.lists.get_mut(parent) {
            list.shift(from, delta);
            if list.is_empty() {
                self.lists.remove(parent);
            }
        }

        let depth = parent.len();
        let vacated = if delta < 0 {
            let amount = delta.unsigned_abs();
            let begin = from.saturating_sub(amount);
            IndexRange::with_count(begin, from.max(amount) - begin)
        } else {
            None
        };

        let lowest = vacated.map_or(from, |w| w.begin());
        let affected: Vec<IndexPath> = self
            .lists
            .keys()
            .filter(|key| parent.is_ancestor_of(key) && key[depth] >= lowest)
            .cloned()
            .collect();
        // Detach every affected list before reinserting: a moved key may
        // collide with a key that has not been moved yet.
        let mut moved = Vec::with_capacity(affected.len());
        for key in affected {
            let Some(list) = self.lists.remove(&key) else {
                continue;
            };
            if vacated.is_some_and(|w| w.contains(key[depth])) {
                continue;
            }
            if let Some(target) = key.shifted(parent, from, delta) {
                moved.push((target, list));
            }
        }
        self.lists.extend(moved);
    }
}

impl fmt::Debug for IndexRanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.lists.iter()).finish()
    }
}

impl fmt::Display for IndexRanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (parent, list)) in self.lists.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{parent}: {list}")?;
        }
        Ok(())
    }
}
