//! Notifications published by a selection model.

use horizon_treeselect_core::Signal;

use super::index_path::IndexPath;
use super::index_ranges::IndexRanges;

/// Payload of [`SelectionSignals::selection_changed`].
#[derive(Debug, Clone)]
pub struct SelectionChangedArgs<T> {
    /// Paths that stopped being selected, including paths whose items were
    /// removed from the source (keyed by their position before removal).
    pub deselected_indexes: IndexRanges,
    /// Paths that became selected.
    pub selected_indexes: IndexRanges,
    /// Items behind `deselected_indexes`, where they could be resolved.
    pub deselected_items: Vec<T>,
    /// Items behind `selected_indexes`.
    pub selected_items: Vec<T>,
}

/// Path-only payload of [`SelectionSignals::selection_paths_changed`], for
/// listeners that do not know the item type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPathsChangedArgs {
    /// Paths that stopped being selected.
    pub deselected_indexes: IndexRanges,
    /// Paths that became selected.
    pub selected_indexes: IndexRanges,
}

/// Payload of [`SelectionSignals::indexes_changed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexesChangedArgs {
    /// Parent whose children moved.
    pub parent_index: IndexPath,
    /// First sibling index that moved.
    pub start_index: usize,
    /// Amount the siblings moved by.
    pub delta: isize,
}

/// Observable properties of a selection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionProperty {
    /// The primary selected path.
    SelectedIndex,
    /// The item at the primary selected path.
    SelectedItem,
    /// The anchor path.
    AnchorIndex,
    /// The list of selected paths.
    SelectedIndexes,
    /// The list of selected items.
    SelectedItems,
    /// The single-selection flag.
    SingleSelect,
    /// The root items view.
    Source,
}

/// Signals emitted by a selection model.
///
/// `selection_changed` and `selection_paths_changed` are fed by the same
/// commit and always fire together, paths first.
pub struct SelectionSignals<T> {
    /// Emitted once per committed batch that changed the selection.
    pub selection_changed: Signal<SelectionChangedArgs<T>>,
    /// Untyped twin of `selection_changed`.
    pub selection_paths_changed: Signal<SelectionPathsChangedArgs>,
    /// Emitted after a commit for each property whose value changed.
    pub property_changed: Signal<SelectionProperty>,
    /// Emitted as soon as stored paths are re-keyed by a sibling shift.
    pub indexes_changed: Signal<IndexesChangedArgs>,
    /// Emitted after a commit for each parent whose children were reset.
    pub source_reset: Signal<IndexPath>,
}

impl<T: Clone + Send + 'static> Default for SelectionSignals<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> SelectionSignals<T> {
    /// Creates a signal set with no connections.
    pub fn new() -> Self {
        Self {
            selection_changed: Signal::new(),
            selection_paths_changed: Signal::new(),
            property_changed: Signal::new(),
            indexes_changed: Signal::new(),
            source_reset: Signal::new(),
        }
    }

    /// Publishes one selection change to both listener sets.
    pub(crate) fn publish_selection_changed(&self, args: SelectionChangedArgs<T>) {
        if self.selection_paths_changed.has_connections() {
            self.selection_paths_changed.emit(SelectionPathsChangedArgs {
                deselected_indexes: args.deselected_indexes.clone(),
                selected_indexes: args.selected_indexes.clone(),
            });
        }
        self.selection_changed.emit(args);
    }

    /// Blocks or unblocks every signal in the set.
    pub fn set_blocked(&self, blocked: bool) {
        self.selection_changed.set_blocked(blocked);
        self.selection_paths_changed.set_blocked(blocked);
        self.property_changed.set_blocked(blocked);
        self.indexes_changed.set_blocked(blocked);
        self.source_reset.set_blocked(blocked);
    }
}

impl<T> std::fmt::Debug for SelectionSignals<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionSignals").finish_non_exhaustive()
    }
}
