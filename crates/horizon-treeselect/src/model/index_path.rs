//! Hierarchical paths for addressing items in a tree.
//!
//! An `IndexPath` is the sequence of sibling indices walked from the
//! synthetic root down to an item. It is a plain value: it does not hold a
//! reference to the tree and survives edits unchanged, which is why selection
//! models re-key stored paths when siblings are inserted or removed.

use std::fmt;
use std::ops::Index;

use horizon_treeselect_core::{Result, SelectionError};

/// Position of an item in a tree, as a sequence of sibling indices.
///
/// The empty path (depth 0) is the synthetic root. It is also the default
/// value and means "unset" wherever a path is optional, such as a selection
/// model's selected index.
///
/// Paths order lexicographically, which is document order: a parent sorts
/// before its children, and `[0, 5]` sorts before `[1]`.
///
/// # Example
///
/// ```
/// use horizon_treeselect::model::IndexPath;
///
/// let path = IndexPath::from([0, 2]);
/// assert_eq!(path.len(), 2);
/// assert_eq!(path.parent(), IndexPath::from([0]));
/// assert_eq!(path.leaf(), Some(2));
/// assert!(IndexPath::from([0]).is_ancestor_of(&path));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexPath {
    indices: Vec<usize>,
}

impl IndexPath {
    /// The unset path (synthetic root).
    #[inline]
    pub const fn unset() -> Self {
        Self {
            indices: Vec::new(),
        }
    }

    /// Creates a path from its sibling indices, root first.
    pub fn new(indices: impl Into<Vec<usize>>) -> Self {
        Self {
            indices: indices.into(),
        }
    }

    /// Returns the depth of this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` for the depth-0 path.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns `true` if this path is the unset/root value.
    #[inline]
    pub fn is_unset(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the sibling index at depth `index`.
    pub fn get_at(&self, index: usize) -> Result<usize> {
        self.indices
            .get(index)
            .copied()
            .ok_or_else(|| SelectionError::out_of_range(index, self.len()))
    }

    /// Returns the components as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    /// Iterates over the components, root first.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Returns the path of the parent item.
    ///
    /// The parent of a root-level item, and of the root itself, is the root.
    pub fn parent(&self) -> IndexPath {
        match self.indices.split_last() {
            Some((_, parent)) => IndexPath::new(parent),
            None => IndexPath::unset(),
        }
    }

    /// Returns the index of this item among its siblings.
    #[inline]
    pub fn leaf(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// Returns `true` if this path is a strict prefix of `other`.
    ///
    /// The root is an ancestor of every non-root path.
    pub fn is_ancestor_of(&self, other: &IndexPath) -> bool {
        self.len() < other.len() && other.indices.starts_with(&self.indices)
    }

    /// Returns `true` if `ancestor` is a strict prefix of this path.
    pub fn is_descendant_of(&self, ancestor: &IndexPath) -> bool {
        ancestor.is_ancestor_of(self)
    }

    /// Returns `true` if this path equals `other` or descends from it.
    pub fn is_same_or_descendant_of(&self, other: &IndexPath) -> bool {
        self == other || self.is_descendant_of(other)
    }

    /// Returns a new path with `index` appended.
    pub fn clone_with_child_index(&self, index: usize) -> IndexPath {
        let mut indices = Vec::with_capacity(self.len() + 1);
        indices.extend_from_slice(&self.indices);
        indices.push(index);
        IndexPath { indices }
    }

    /// Applies a sibling shift under `parent`.
    ///
    /// Returns the moved path when this path descends from `parent` and its
    /// component at `parent.len()` is at least `from`; `None` when the shift
    /// does not affect it. A shift that would move the component below zero
    /// also returns `None`; such paths must be handled as removed.
    pub fn shifted(&self, parent: &IndexPath, from: usize, delta: isize) -> Option<IndexPath> {
        if delta == 0 || !parent.is_ancestor_of(self) {
            return None;
        }
        let depth = parent.len();
        let component = self.indices[depth];
        if component < from {
            return None;
        }
        let moved = component.checked_add_signed(delta)?;
        let mut indices = self.indices.clone();
        indices[depth] = moved;
        Some(IndexPath { indices })
    }
}

impl Index<usize> for IndexPath {
    type Output = usize;

    fn index(&self, index: usize) -> &usize {
        &self.indices[index]
    }
}

impl From<Vec<usize>> for IndexPath {
    fn from(indices: Vec<usize>) -> Self {
        Self { indices }
    }
}

impl From<&[usize]> for IndexPath {
    fn from(indices: &[usize]) -> Self {
        Self::new(indices)
    }
}

impl<const N: usize> From<[usize; N]> for IndexPath {
    fn from(indices: [usize; N]) -> Self {
        Self::new(indices)
    }
}

impl FromIterator<usize> for IndexPath {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            write!(f, "IndexPath(unset)")
        } else {
            write!(f, "IndexPath({:?})", self.indices)
        }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.indices.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_path() {
        let path = IndexPath::default();
        assert!(path.is_unset());
        assert_eq!(path.len(), 0);
        assert_eq!(path.leaf(), None);
        assert_eq!(path.parent(), IndexPath::unset());
    }

    #[test]
    fn test_get_at() {
        let path = IndexPath::from([4, 1]);
        assert_eq!(path.get_at(0), Ok(4));
        assert_eq!(path.get_at(1), Ok(1));
        assert_eq!(path.get_at(2), Err(SelectionError::out_of_range(2, 2)));
        assert_eq!(path[0], 4);
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_range_panics() {
        let path = IndexPath::from([1]);
        let _ = path[1];
    }

    #[test]
    fn test_parent_and_leaf() {
        let path = IndexPath::from([0, 2, 7]);
        assert_eq!(path.parent(), IndexPath::from([0, 2]));
        assert_eq!(path.leaf(), Some(7));
        assert_eq!(IndexPath::from([3]).parent(), IndexPath::unset());
    }

    #[test]
    fn test_ancestry() {
        let root = IndexPath::unset();
        let level1 = IndexPath::from([0]);
        let level2 = IndexPath::from([0, 1]);
        let other = IndexPath::from([1, 1]);

        assert!(root.is_ancestor_of(&level1));
        assert!(level1.is_ancestor_of(&level2));
        assert!(!level2.is_ancestor_of(&level1));
        assert!(!level1.is_ancestor_of(&level1));
        assert!(!level1.is_ancestor_of(&other));
        assert!(level2.is_descendant_of(&root));
        assert!(level1.is_same_or_descendant_of(&level1));
        assert!(!root.is_ancestor_of(&root));
    }

    #[test]
    fn test_clone_with_child_index() {
        let path = IndexPath::from([2]).clone_with_child_index(5);
        assert_eq!(path, IndexPath::from([2, 5]));
        assert_eq!(IndexPath::unset().clone_with_child_index(1), IndexPath::from([1]));
    }

    #[test]
    fn test_shifted() {
        let parent = IndexPath::from([0]);
        assert_eq!(
            IndexPath::from([0, 3]).shifted(&parent, 2, 1),
            Some(IndexPath::from([0, 4]))
        );
        assert_eq!(IndexPath::from([0, 1]).shifted(&parent, 2, 1), None);
        assert_eq!(
            IndexPath::from([0, 5, 2]).shifted(&parent, 4, -2),
            Some(IndexPath::from([0, 3, 2]))
        );
        // Not under the parent
        assert_eq!(IndexPath::from([1, 5]).shifted(&parent, 0, 1), None);
        // The parent itself is never shifted
        assert_eq!(parent.shifted(&parent, 0, 1), None);
        // Root-level shift
        assert_eq!(
            IndexPath::from([2, 0]).shifted(&IndexPath::unset(), 1, 3),
            Some(IndexPath::from([5, 0]))
        );
    }

    #[test]
    fn test_document_ordering() {
        let mut paths = vec![
            IndexPath::from([1]),
            IndexPath::from([0, 5]),
            IndexPath::from([0]),
            IndexPath::from([0, 2, 1]),
        ];
        paths.sort();
        assert_eq!(
            paths,
            vec![
                IndexPath::from([0]),
                IndexPath::from([0, 2, 1]),
                IndexPath::from([0, 5]),
                IndexPath::from([1]),
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(IndexPath::from([0, 2, 1]).to_string(), "[0, 2, 1]");
        assert_eq!(IndexPath::unset().to_string(), "[]");
        assert_eq!(format!("{:?}", IndexPath::unset()), "IndexPath(unset)");
    }
}
