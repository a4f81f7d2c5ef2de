//! The uncommitted effect of one batch.

use super::index_path::IndexPath;
use super::index_ranges::IndexRanges;
use super::selection_node::RemovedSelection;

/// Changes accumulated by a selection model while a batch is open.
///
/// A batch never touches the committed selection. Calls record what they
/// want here; closing the outermost batch commits the net effect at once and
/// publishes one notification.
///
/// Within one operation a path is never both pending-selected and
/// pending-deselected: recording one removes the other, so the last call on a
/// path wins.
#[derive(Debug)]
pub struct PendingOperation<T> {
    depth: usize,
    /// Proposed primary selection.
    pub selected_index: IndexPath,
    /// Proposed anchor.
    pub anchor_index: IndexPath,
    /// Paths to select on commit.
    pub selected: IndexRanges,
    /// Paths to deselect on commit.
    pub deselected: IndexRanges,
    /// Paths forcibly deselected because their items left the source, keyed
    /// by their position before the removal.
    pub removed: IndexRanges,
    /// Items that left the source while selected.
    pub removed_items: Vec<T>,
    /// Parents whose children were reset wholesale.
    pub reset_parents: Vec<IndexPath>,
}

impl<T> PendingOperation<T> {
    /// Opens an operation seeded with the committed primary and anchor paths.
    pub fn new(selected_index: IndexPath, anchor_index: IndexPath) -> Self {
        Self {
            depth: 1,
            selected_index,
            anchor_index,
            selected: IndexRanges::new(),
            deselected: IndexRanges::new(),
            removed: IndexRanges::new(),
            removed_items: Vec::new(),
            reset_parents: Vec::new(),
        }
    }

    /// Current batch nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn enter(&mut self) -> usize {
        self.depth += 1;
        self.depth
    }

    /// Returns `true` when the outermost batch just closed.
    pub(crate) fn exit(&mut self) -> bool {
        self.depth = self.depth.saturating_sub(1);
        self.depth == 0
    }

    /// Records a select of `path`, cancelling a pending deselect of it.
    pub fn select_path(&mut self, path: &IndexPath) {
        self.deselected.remove(path);
        self.selected.add(path);
    }

    /// Records a deselect of `path`, cancelling a pending select of it.
    pub fn deselect_path(&mut self, path: &IndexPath) {
        self.selected.remove(path);
        self.deselected.add(path);
    }

    /// Returns `true` if `path` will be selected by this operation.
    pub fn is_pending_select(&self, path: &IndexPath) -> bool {
        self.selected.contains(path)
    }

    /// Returns `true` if `path` will be deselected by this operation.
    pub fn is_pending_deselect(&self, path: &IndexPath) -> bool {
        self.deselected.contains(path)
    }

    /// Records selected paths whose items left the source.
    pub fn record_removed(&mut self, removed: RemovedSelection<T>) {
        for path in &removed.paths {
            self.removed.add(path);
        }
        self.removed_items.extend(removed.items);
    }

    /// Moves pending paths after a sibling shift under `parent`.
    pub fn shift(&mut self, parent: &IndexPath, from: usize, delta: isize) {
        self.selected.shift(parent, from, delta);
        self.deselected.shift(parent, from, delta);
        for path in [&mut self.selected_index, &mut self.anchor_index] {
            if let Some(moved) = path.shifted(parent, from, delta) {
                *path = moved;
            }
        }
    }

    /// Forgets pending changes to the sibling window `[start, start + count)`
    /// under `parent` and to everything beneath it.
    ///
    /// A proposed primary or anchor path inside the window is unset.
    pub fn discard_window(&mut self, parent: &IndexPath, start: usize, count: usize) {
        self.selected.remove_window(parent, start, count);
        self.deselected.remove_window(parent, start, count);
        let depth = parent.len();
        for path in [&mut self.selected_index, &mut self.anchor_index] {
            if parent.is_ancestor_of(path) && (start..start.saturating_add(count)).contains(&path[depth]) {
                *path = IndexPath::unset();
            }
        }
    }

    /// Forgets pending changes beneath `parent` and unsets proposals that
    /// descend from it.
    pub fn discard_under(&mut self, parent: &IndexPath) {
        self.selected.clear_under(parent);
        self.deselected.clear_under(parent);
        for path in [&mut self.selected_index, &mut self.anchor_index] {
            if parent.is_ancestor_of(path) {
                *path = IndexPath::unset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p<const N: usize>(indices: [usize; N]) -> IndexPath {
        IndexPath::from(indices)
    }

    #[test]
    fn test_nesting() {
        let mut op = PendingOperation::<()>::new(IndexPath::unset(), IndexPath::unset());
        assert_eq!(op.depth(), 1);
        assert_eq!(op.enter(), 2);
        assert!(!op.exit());
        assert!(op.exit());
    }

    #[test]
    fn test_last_call_wins() {
        let mut op = PendingOperation::<()>::new(IndexPath::unset(), IndexPath::unset());
        op.select_path(&p([0, 1]));
        op.deselect_path(&p([0, 1]));
        assert!(!op.is_pending_select(&p([0, 1])));
        assert!(op.is_pending_deselect(&p([0, 1])));

        op.select_path(&p([0, 1]));
        assert!(op.is_pending_select(&p([0, 1])));
        assert!(!op.is_pending_deselect(&p([0, 1])));
    }

    #[test]
    fn test_shift_moves_proposals() {
        let mut op = PendingOperation::<()>::new(p([0, 3]), p([0, 1]));
        op.select_path(&p([0, 3]));
        op.shift(&p([0]), 2, 1);
        assert_eq!(op.selected_index, p([0, 4]));
        assert_eq!(op.anchor_index, p([0, 1]));
        assert!(op.is_pending_select(&p([0, 4])));
    }

    #[test]
    fn test_shift_keeps_every_pending_child_selection() {
        let mut op = PendingOperation::<()>::new(IndexPath::unset(), IndexPath::unset());
        op.select_path(&p([0, 2, 0]));
        op.select_path(&p([0, 3, 1]));
        op.deselect_path(&p([0, 4, 2]));
        op.shift(&p([0]), 2, 1);
        assert_eq!(op.selected.paths(), vec![p([0, 3, 0]), p([0, 4, 1])]);
        assert_eq!(op.deselected.paths(), vec![p([0, 5, 2])]);
    }

    #[test]
    fn test_record_removed() {
        let mut op = PendingOperation::new(IndexPath::unset(), IndexPath::unset());
        assert!(op.removed.is_empty());
        op.record_removed(RemovedSelection {
            paths: vec![p([2]), p([2, 0])],
            items: vec!["gone"],
        });
        assert_eq!(op.removed.count(), 2);
        assert_eq!(op.removed_items, vec!["gone"]);
    }

    #[test]
    fn test_discard_window_unsets_proposals() {
        let mut op = PendingOperation::<()>::new(p([0, 1, 4]), p([0, 3]));
        op.select_path(&p([0, 1]));
        op.select_path(&p([0, 2]));
        op.discard_window(&p([0]), 1, 1);
        assert!(op.selected_index.is_unset());
        assert_eq!(op.anchor_index, p([0, 3]));
        assert_eq!(op.selected.paths(), vec![p([0, 2])]);
    }

    #[test]
    fn test_discard_under() {
        let mut op = PendingOperation::<()>::new(p([1, 0]), p([1]));
        op.select_path(&p([1, 0]));
        op.select_path(&p([2]));
        op.discard_under(&p([1]));
        assert!(op.selected_index.is_unset());
        assert_eq!(op.anchor_index, p([1]));
        assert_eq!(op.selected.paths(), vec![p([2])]);
    }
}
