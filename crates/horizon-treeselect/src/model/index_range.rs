//! Closed intervals of sibling indices and their canonical lists.
//!
//! A selection rarely stores one entry per selected item. Siblings selected
//! together collapse into [`IndexRange`]s, and the ranges under one parent are
//! kept in an [`IndexRangeList`] in canonical form: sorted, with no two
//! ranges overlapping or touching.
//!
//! The list is a sorted vector searched with `partition_point`, so lookups
//! are O(log n) and edits are O(n) in the number of ranges.

use std::fmt;

/// A closed interval `[begin, end]` of sibling indices.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexRange {
    begin: usize,
    end: usize,
}

impl IndexRange {
    /// Creates a range covering `begin..=end`.
    ///
    /// The bounds are swapped if given in reverse order.
    pub fn new(begin: usize, end: usize) -> Self {
        if begin <= end {
            Self { begin, end }
        } else {
            Self {
                begin: end,
                end: begin,
            }
        }
    }

    /// Creates a range holding exactly one index.
    #[inline]
    pub fn single(index: usize) -> Self {
        Self {
            begin: index,
            end: index,
        }
    }

    /// Creates a range of `count` indices starting at `start`.
    ///
    /// Returns `None` when `count` is zero.
    pub fn with_count(start: usize, count: usize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        let end = start.saturating_add(count - 1);
        Some(Self { begin: start, end })
    }

    /// First index in the range.
    #[inline]
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// Last index in the range (inclusive).
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of indices covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.begin + 1
    }

    /// A range is never empty; provided for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` if `index` lies in the range.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.begin <= index && index <= self.end
    }

    /// Returns `true` if the two ranges share at least one index.
    pub fn overlaps(&self, other: &IndexRange) -> bool {
        self.begin <= other.end && other.begin <= self.end
    }

    /// Returns `true` if the two ranges overlap or abut, so their union is
    /// one contiguous range.
    pub fn touches(&self, other: &IndexRange) -> bool {
        self.begin <= other.end.saturating_add(1) && other.begin <= self.end.saturating_add(1)
    }

    /// Returns the shared part of the two ranges.
    pub fn intersection(&self, other: &IndexRange) -> Option<IndexRange> {
        if !self.overlaps(other) {
            return None;
        }
        Some(IndexRange {
            begin: self.begin.max(other.begin),
            end: self.end.min(other.end),
        })
    }

    /// Iterates over the indices in the range.
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.begin..=self.end
    }

    fn offset_up(self, amount: usize) -> Self {
        Self {
            begin: self.begin.saturating_add(amount),
            end: self.end.saturating_add(amount),
        }
    }

    fn offset_down(self, amount: usize) -> Self {
        Self {
            begin: self.begin - amount,
            end: self.end - amount,
        }
    }
}

impl fmt::Debug for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.begin, self.end)
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.begin == self.end {
            write!(f, "{}", self.begin)
        } else {
            write!(f, "{}-{}", self.begin, self.end)
        }
    }
}

/// Sum of the lengths of `ranges`.
pub fn total_len(ranges: &[IndexRange]) -> usize {
    ranges.iter().map(IndexRange::len).sum()
}

/// An ordered list of disjoint, non-adjacent ranges.
///
/// Every mutation returns the sub-ranges whose membership actually changed,
/// which is what selection change notifications report.
///
/// # Example
///
/// ```
/// use horizon_treeselect::model::{IndexRange, IndexRangeList};
///
/// let mut list = IndexRangeList::new();
/// list.add(IndexRange::new(1, 3));
/// let added = list.add(IndexRange::new(2, 6));
///
/// assert_eq!(added, vec![IndexRange::new(4, 6)]);
/// assert_eq!(list.ranges(), &[IndexRange::new(1, 6)]);
/// assert!(list.contains(5));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct IndexRangeList {
    ranges: Vec<IndexRange>,
}

impl IndexRangeList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The ranges, sorted and disjoint.
    #[inline]
    pub fn ranges(&self) -> &[IndexRange] {
        &self.ranges
    }

    /// Iterates over the ranges.
    pub fn iter(&self) -> std::slice::Iter<'_, IndexRange> {
        self.ranges.iter()
    }

    /// Iterates over every index in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.ranges.iter().flat_map(IndexRange::indices)
    }

    /// Returns `true` if no index is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of ranges (not indices).
    #[inline]
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    /// Total number of indices covered.
    pub fn count(&self) -> usize {
        total_len(&self.ranges)
    }

    /// Lowest index present.
    pub fn first(&self) -> Option<usize> {
        self.ranges.first().map(IndexRange::begin)
    }

    /// Highest index present.
    pub fn last(&self) -> Option<usize> {
        self.ranges.last().map(IndexRange::end)
    }

    /// Returns `true` if `index` is present.
    pub fn contains(&self, index: usize) -> bool {
        let pos = self.ranges.partition_point(|r| r.end < index);
        self.ranges.get(pos).is_some_and(|r| r.begin <= index)
    }

    /// Returns the index at ordinal position `n`, counting across ranges.
    pub fn nth(&self, n: usize) -> Option<usize> {
        let mut remaining = n;
        for range in &self.ranges {
            let len = range.len();
            if remaining < len {
                return Some(range.begin + remaining);
            }
            remaining -= len;
        }
        None
    }

    /// Adds `range`, merging with overlapping and adjacent ranges.
    ///
    /// Returns the parts of `range` that were not already present.
    pub fn add(&mut self, range: IndexRange) -> Vec<IndexRange> {
        let lo = self
            .ranges
            .partition_point(|r| r.end.saturating_add(1) < range.begin);
        let hi = self
            .ranges
            .partition_point(|r| r.begin <= range.end.saturating_add(1));

        let mut added = Vec::new();
        let mut cursor = Some(range.begin);
        for existing in &self.ranges[lo..hi] {
            let Some(next) = cursor else { break };
            if next > range.end {
                break;
            }
            if existing.begin > next {
                added.push(IndexRange::new(next, (existing.begin - 1).min(range.end)));
            }
            if existing.end >= next {
                cursor = existing.end.checked_add(1);
            }
        }
        if let Some(next) = cursor {
            if next <= range.end {
                added.push(IndexRange::new(next, range.end));
            }
        }

        if added.is_empty() {
            return added;
        }

        let merged = match (self.ranges.get(lo), hi.checked_sub(1).and_then(|i| self.ranges.get(i))) {
            (Some(first), Some(last)) if lo < hi => IndexRange {
                begin: first.begin.min(range.begin),
                end: last.end.max(range.end),
            },
            _ => range,
        };
        self.ranges.splice(lo..hi, std::iter::once(merged));
        added
    }

    /// Removes `range`, splitting ranges that straddle its bounds.
    ///
    /// Returns the parts of `range` that were present.
    pub fn remove(&mut self, range: IndexRange) -> Vec<IndexRange> {
        let lo = self.ranges.partition_point(|r| r.end < range.begin);
        let hi = self.ranges.partition_point(|r| r.begin <= range.end);
        if lo >= hi {
            return Vec::new();
        }

        let mut removed = Vec::with_capacity(hi - lo);
        let mut kept = Vec::with_capacity(2);
        for existing in &self.ranges[lo..hi] {
            if let Some(shared) = existing.intersection(&range) {
                removed.push(shared);
            }
            if existing.begin < range.begin {
                kept.push(IndexRange::new(existing.begin, range.begin - 1));
            }
            if existing.end > range.end {
                kept.push(IndexRange::new(range.end + 1, existing.end));
            }
        }
        self.ranges.splice(lo..hi, kept);
        removed
    }

    /// Removes everything, returning the ranges that were present.
    pub fn clear(&mut self) -> Vec<IndexRange> {
        std::mem::take(&mut self.ranges)
    }

    /// Re-keys indices after siblings were inserted or removed.
    ///
    /// With `delta > 0`, `delta` siblings were inserted at `from`: every index
    /// `>= from` moves up and a range straddling `from` is split.
    ///
    /// With `delta < 0`, `-delta` siblings ending at `from` were removed: the
    /// vacated window `[from + delta, from)` is dropped and every index
    /// `>= from` moves down, merging ranges that become adjacent. Indices that
    /// would move below zero are dropped along with the window.
    ///
    /// Returns the dropped ranges, in their pre-shift positions.
    pub fn shift(&mut self, from: usize, delta: isize) -> Vec<IndexRange> {
        if delta == 0 || self.ranges.is_empty() {
            return Vec::new();
        }

        let amount = delta.unsigned_abs();
        if delta > 0 {
            let split = self.ranges.partition_point(|r| r.end < from);
            let mut tail: Vec<IndexRange> = self.ranges.drain(split..).collect();
            if let Some(first) = tail.first_mut() {
                if first.begin < from {
                    self.ranges.push(IndexRange::new(first.begin, from - 1));
                    first.begin = from;
                }
            }
            self.ranges
                .extend(tail.into_iter().map(|r| r.offset_up(amount)));
            return Vec::new();
        }

        let window_begin = from.saturating_sub(amount);
        let window_end = from.max(amount);
        let dropped = if window_end > window_begin {
            self.remove(IndexRange::new(window_begin, window_end - 1))
        } else {
            Vec::new()
        };

        let split = self.ranges.partition_point(|r| r.end < window_end);
        if split < self.ranges.len() {
            for range in &mut self.ranges[split..] {
                *range = range.offset_down(amount);
            }
            if split > 0 && self.ranges[split - 1].touches(&self.ranges[split]) {
                let joined_end = self.ranges[split].end;
                self.ranges[split - 1].end = joined_end;
                self.ranges.remove(split);
            }
        }
        dropped
    }
}

impl FromIterator<IndexRange> for IndexRangeList {
    fn from_iter<I: IntoIterator<Item = IndexRange>>(iter: I) -> Self {
        let mut list = IndexRangeList::new();
        for range in iter {
            list.add(range);
        }
        list
    }
}

impl<'a> IntoIterator for &'a IndexRangeList {
    type Item = &'a IndexRange;
    type IntoIter = std::slice::Iter<'a, IndexRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

impl fmt::Debug for IndexRangeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ranges.iter()).finish()
    }
}

impl fmt::Display for IndexRangeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{range}")?;
        }
        write!(f, "}}")
    }
}
