//! Hierarchical in-memory item source.
//!
//! `TreeModel` stores data in a tree of shared [`TreeNode`]s and exposes each
//! level as a live [`ItemsView`], so a [`SelectionModel`] can select its
//! items directly. Edits emit structural signals that an attached selection
//! model follows automatically.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use horizon_treeselect_core::logging::targets;
use horizon_treeselect_core::{ConnectionId, Result, SelectionError, Signal};

use super::index_path::IndexPath;
use super::selection::SelectionModel;
use super::source::{ChildrenAccessor, ItemsView, ItemsViewRef};

/// A node ID for identity checks.
pub type NodeId = u64;

/// Counter for generating unique node IDs.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_node_id() -> NodeId {
    NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Handle to a node of a [`TreeModel`]; the item type it exposes.
pub type TreeItem<D> = Arc<TreeNode<D>>;

/// The children of one node, shared with every view handed out for them.
struct ChildList<D> {
    items: RwLock<Vec<TreeItem<D>>>,
}

impl<D> ChildList<D> {
    fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }
}

impl<D: Send + Sync> ItemsView<TreeItem<D>> for ChildList<D> {
    fn count(&self) -> usize {
        self.items.read().len()
    }

    fn item_at(&self, index: usize) -> Option<TreeItem<D>> {
        self.items.read().get(index).cloned()
    }
}

/// A node in the tree structure.
pub struct TreeNode<D> {
    id: NodeId,
    data: RwLock<D>,
    children: Arc<ChildList<D>>,
}

impl<D> TreeNode<D> {
    fn new(data: D) -> Self {
        Self {
            id: next_node_id(),
            data: RwLock::new(data),
            children: Arc::new(ChildList::new()),
        }
    }

    /// Unique ID of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Provides read access to the node's data.
    pub fn with_data<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&D) -> R,
    {
        f(&self.data.read())
    }

    /// Replaces the node's data.
    pub fn set_data(&self, data: D) {
        *self.data.write() = data;
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.children.items.read().len()
    }
}

impl<D: Clone> TreeNode<D> {
    /// Returns a copy of the node's data.
    pub fn data(&self) -> D {
        self.data.read().clone()
    }
}

impl<D: fmt::Debug> fmt::Debug for TreeNode<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("id", &self.id)
            .field("data", &*self.data.read())
            .field("children", &self.children.items.read().len())
            .finish()
    }
}

impl<D> PartialEq for TreeNode<D> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<D> Eq for TreeNode<D> {}

/// Signals emitted by a [`TreeModel`] after each edit.
pub struct TreeModelSignals<D> {
    /// Emitted after rows have been inserted.
    /// Args: (parent path, first row, count)
    pub rows_inserted: Signal<(IndexPath, usize, usize)>,

    /// Emitted after rows have been removed.
    /// Args: (parent path, first row, removed items)
    pub rows_removed: Signal<(IndexPath, usize, Vec<TreeItem<D>>)>,

    /// Emitted after the whole tree was cleared.
    pub model_reset: Signal<()>,
}

impl<D: Send + Sync + 'static> TreeModelSignals<D> {
    fn new() -> Self {
        Self {
            rows_inserted: Signal::new(),
            rows_removed: Signal::new(),
            model_reset: Signal::new(),
        }
    }
}

/// Connections wiring a selection model to the tree's signals.
struct Attachment {
    inserted: ConnectionId,
    removed: ConnectionId,
    reset: ConnectionId,
}

/// A hierarchical tree model addressed by [`IndexPath`]s.
///
/// Each level is exposed as a live [`ItemsView`]: views handed out earlier
/// keep reporting the current children. Signals are emitted after the
/// storage locks are released, so slots may read the tree.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use parking_lot::Mutex;
/// use horizon_treeselect::model::{IndexPath, SelectionModel, TreeModel};
///
/// let tree = TreeModel::new();
/// tree.append_root("Documents");
/// let music = tree.append_root("Music");
/// tree.append_child(&music, "song.ogg");
///
/// let selection = Arc::new(Mutex::new(
///     SelectionModel::builder()
///         .source(tree.root_view())
///         .children(tree.children_accessor())
///         .build(),
/// ));
/// tree.attach_selection(selection.clone()).unwrap();
///
/// selection.lock().select(&IndexPath::from([1, 0]));
/// tree.insert(&IndexPath::unset(), 0, "Desktop");
///
/// assert_eq!(selection.lock().selected_index(), IndexPath::from([2, 0]));
/// ```
pub struct TreeModel<D> {
    root: Arc<ChildList<D>>,
    signals: TreeModelSignals<D>,
    attachment: Mutex<Option<Attachment>>,
}

impl<D: Send + Sync + 'static> Default for TreeModel<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Send + Sync + 'static> TreeModel<D> {
    /// Creates a new empty tree model.
    pub fn new() -> Self {
        Self {
            root: Arc::new(ChildList::new()),
            signals: TreeModelSignals::new(),
            attachment: Mutex::new(None),
        }
    }

    /// The signals emitted by this model.
    pub fn signals(&self) -> &TreeModelSignals<D> {
        &self.signals
    }

    /// The children list of the item at `parent`; the root list for the root path.
    fn list_at(&self, parent: &IndexPath) -> Option<Arc<ChildList<D>>> {
        let mut list = Arc::clone(&self.root);
        for index in parent.iter() {
            let next = Arc::clone(&list.items.read().get(index)?.children);
            list = next;
        }
        Some(list)
    }

    /// Adds a root-level node and returns its path.
    pub fn append_root(&self, data: D) -> IndexPath {
        let row = {
            let mut items = self.root.items.write();
            items.push(Arc::new(TreeNode::new(data)));
            items.len() - 1
        };
        self.signals
            .rows_inserted
            .emit((IndexPath::unset(), row, 1));
        IndexPath::new([row])
    }

    /// Adds a node as the last child of `parent` and returns its path.
    ///
    /// Returns `None` if the parent doesn't exist.
    pub fn append_child(&self, parent: &IndexPath, data: D) -> Option<IndexPath> {
        let list = self.list_at(parent)?;
        let row = {
            let mut items = list.items.write();
            items.push(Arc::new(TreeNode::new(data)));
            items.len() - 1
        };
        self.signals.rows_inserted.emit((parent.clone(), row, 1));
        Some(parent.clone_with_child_index(row))
    }

    /// Inserts a node under `parent` at `index`, shifting later siblings.
    ///
    /// Returns `None` if the parent doesn't exist or `index` is past the end.
    pub fn insert(&self, parent: &IndexPath, index: usize, data: D) -> Option<IndexPath> {
        let list = self.list_at(parent)?;
        {
            let mut items = list.items.write();
            if index > items.len() {
                return None;
            }
            items.insert(index, Arc::new(TreeNode::new(data)));
        }
        self.signals.rows_inserted.emit((parent.clone(), index, 1));
        Some(parent.clone_with_child_index(index))
    }

    /// Removes a node and its descendants.
    ///
    /// Returns the removed node, or `None` if it doesn't exist.
    pub fn remove(&self, path: &IndexPath) -> Option<TreeItem<D>> {
        let index = path.leaf()?;
        self.remove_range(&path.parent(), index, 1).into_iter().next()
    }

    /// Removes up to `count` children of `parent` starting at `start`.
    ///
    /// Returns the removed nodes; empty if nothing was removed.
    pub fn remove_range(&self, parent: &IndexPath, start: usize, count: usize) -> Vec<TreeItem<D>> {
        let Some(list) = self.list_at(parent) else {
            return Vec::new();
        };
        let removed: Vec<TreeItem<D>> = {
            let mut items = list.items.write();
            if start >= items.len() {
                return Vec::new();
            }
            let end = start.saturating_add(count).min(items.len());
            items.drain(start..end).collect()
        };
        if !removed.is_empty() {
            self.signals
                .rows_removed
                .emit((parent.clone(), start, removed.clone()));
        }
        removed
    }

    /// Removes every node.
    pub fn clear(&self) {
        self.root.items.write().clear();
        self.signals.model_reset.emit(());
    }

    /// Returns the node at `path`.
    pub fn item_at(&self, path: &IndexPath) -> Option<TreeItem<D>> {
        let index = path.leaf()?;
        let list = self.list_at(&path.parent())?;
        list.items.read().get(index).cloned()
    }

    /// Number of children of `parent`; root-level count for the root path.
    pub fn child_count(&self, parent: &IndexPath) -> usize {
        self.list_at(parent)
            .map_or(0, |list| list.items.read().len())
    }

    /// Returns `true` if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.root.items.read().is_empty()
    }

    /// Provides read access to a node's data.
    pub fn with_data<F, R>(&self, path: &IndexPath, f: F) -> Option<R>
    where
        F: FnOnce(&D) -> R,
    {
        self.item_at(path).map(|node| node.with_data(f))
    }

    /// Live view over the root-level nodes.
    pub fn root_view(&self) -> ItemsViewRef<TreeItem<D>> {
        Arc::clone(&self.root) as ItemsViewRef<TreeItem<D>>
    }

    /// Accessor resolving a node's children to a live view.
    pub fn children_accessor(&self) -> ChildrenAccessor<TreeItem<D>> {
        Arc::new(|node: &TreeItem<D>| {
            Some(Arc::clone(&node.children) as ItemsViewRef<TreeItem<D>>)
        })
    }

    // =========================================================================
    // Selection Binding
    // =========================================================================

    /// Forwards this tree's structural signals to `selection`.
    ///
    /// Insertions become [`SelectionModel::items_inserted`], removals
    /// [`SelectionModel::items_removed`] and clears
    /// [`SelectionModel::on_source_reset`]. The selection lock is taken from
    /// inside the signal slots, so it must not be held while editing the tree.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::AlreadyAttached`] if a selection model is
    /// already attached.
    pub fn attach_selection(
        &self,
        selection: Arc<Mutex<SelectionModel<TreeItem<D>>>>,
    ) -> Result<()> {
        let mut attachment = self.attachment.lock();
        if attachment.is_some() {
            return Err(SelectionError::AlreadyAttached);
        }

        let target = Arc::clone(&selection);
        let inserted = self
            .signals
            .rows_inserted
            .connect(move |(parent, first, count)| {
                target.lock().items_inserted(parent, *first, *count);
            });

        let target = Arc::clone(&selection);
        let removed = self
            .signals
            .rows_removed
            .connect(move |(parent, first, items)| {
                target.lock().items_removed(parent, *first, items.len(), items);
            });

        let target = selection;
        let reset = self.signals.model_reset.connect(move |()| {
            target.lock().on_source_reset(&IndexPath::unset());
        });

        *attachment = Some(Attachment {
            inserted,
            removed,
            reset,
        });
        tracing::debug!(target: targets::SOURCE, "selection model attached");
        Ok(())
    }

    /// Disconnects the attached selection model.
    ///
    /// Returns `true` if one was attached.
    pub fn detach_selection(&self) -> bool {
        let Some(attachment) = self.attachment.lock().take() else {
            return false;
        };
        self.signals.rows_inserted.disconnect(attachment.inserted);
        self.signals.rows_removed.disconnect(attachment.removed);
        self.signals.model_reset.disconnect(attachment.reset);
        tracing::debug!(target: targets::SOURCE, "selection model detached");
        true
    }

    /// Returns `true` if a selection model is attached.
    pub fn has_selection(&self) -> bool {
        self.attachment.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p<const N: usize>(indices: [usize; N]) -> IndexPath {
        IndexPath::from(indices)
    }

    fn sample() -> TreeModel<String> {
        let tree = TreeModel::new();
        let docs = tree.append_root("Documents".to_string());
        tree.append_child(&docs, "a.txt".to_string());
        tree.append_child(&docs, "b.txt".to_string());
        tree.append_root("Music".to_string());
        tree
    }

    fn name(tree: &TreeModel<String>, path: IndexPath) -> Option<String> {
        tree.with_data(&path, |data| data.clone())
    }

    #[test]
    fn test_tree_model_hierarchy() {
        let tree = sample();
        assert_eq!(tree.child_count(&IndexPath::unset()), 2);
        assert_eq!(tree.child_count(&p([0])), 2);
        assert_eq!(name(&tree, p([0, 1])), Some("b.txt".to_string()));
        assert_eq!(name(&tree, p([1])), Some("Music".to_string()));
        assert!(tree.item_at(&p([0, 2])).is_none());
        assert!(tree.append_child(&p([5]), "nope".to_string()).is_none());
    }

    #[test]
    fn test_insert_and_remove() {
        let tree = sample();
        assert_eq!(tree.insert(&p([0]), 0, "first.txt".to_string()), Some(p([0, 0])));
        assert_eq!(name(&tree, p([0, 1])), Some("a.txt".to_string()));
        assert!(tree.insert(&p([0]), 9, "x".to_string()).is_none());

        let removed = tree.remove(&p([0])).unwrap();
        assert_eq!(removed.data(), "Documents");
        assert_eq!(removed.child_count(), 3);
        assert_eq!(name(&tree, p([0])), Some("Music".to_string()));
    }

    #[test]
    fn test_views_are_live() {
        let tree = sample();
        let root = tree.root_view();
        let children = tree.children_accessor();
        let docs = root.item_at(0).unwrap();
        let docs_children = children(&docs).unwrap();
        assert_eq!(docs_children.count(), 2);

        tree.append_child(&p([0]), "c.txt".to_string());
        assert_eq!(docs_children.count(), 3);
        tree.append_root("Pictures".to_string());
        assert_eq!(root.count(), 3);
    }

    #[test]
    fn test_signals_emitted_after_unlock() {
        let tree = Arc::new(sample());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let tree_clone = Arc::clone(&tree);
        let seen_clone = Arc::clone(&seen);
        tree.signals().rows_inserted.connect(move |(parent, first, count)| {
            // Reading the tree here would deadlock if the write lock were held.
            let total = tree_clone.child_count(parent);
            seen_clone.lock().push((parent.clone(), *first, *count, total));
        });

        tree.append_child(&p([1]), "song.ogg".to_string());
        assert_eq!(*seen.lock(), vec![(p([1]), 0, 1, 1)]);
    }

    #[test]
    fn test_remove_range_reports_items() {
        let tree = sample();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        tree.signals().rows_removed.connect(move |(parent, first, items)| {
            let names: Vec<String> = items.iter().map(|item| item.data()).collect();
            seen_clone.lock().push((parent.clone(), *first, names));
        });

        let removed = tree.remove_range(&p([0]), 0, 5);
        assert_eq!(removed.len(), 2);
        assert!(tree.remove_range(&p([0]), 0, 1).is_empty());
        assert_eq!(
            *seen.lock(),
            vec![(p([0]), 0, vec!["a.txt".to_string(), "b.txt".to_string()])]
        );
    }

    #[test]
    fn test_node_identity() {
        let tree = sample();
        let a = tree.item_at(&p([0])).unwrap();
        let b = tree.item_at(&p([0])).unwrap();
        let c = tree.item_at(&p([1])).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_attach_twice_fails() {
        let tree = sample();
        let selection = Arc::new(Mutex::new(
            SelectionModel::builder()
                .source(tree.root_view())
                .children(tree.children_accessor())
                .build(),
        ));
        assert!(tree.attach_selection(selection.clone()).is_ok());
        assert_eq!(
            tree.attach_selection(selection.clone()),
            Err(SelectionError::AlreadyAttached)
        );
        assert_eq!(tree.signals().rows_inserted.connection_count(), 1);

        assert!(tree.detach_selection());
        assert!(!tree.detach_selection());
        assert!(!tree.has_selection());
        assert_eq!(tree.signals().rows_inserted.connection_count(), 0);
    }

    #[test]
    fn test_attached_selection_follows_edits() {
        let tree = sample();
        let selection = Arc::new(Mutex::new(
            SelectionModel::builder()
                .single_select(false)
                .source(tree.root_view())
                .children(tree.children_accessor())
                .build(),
        ));
        tree.attach_selection(selection.clone()).unwrap();

        selection.lock().select(&p([0, 1]));
        selection.lock().select(&p([1]));

        tree.insert(&p([0]), 0, "new.txt".to_string());
        assert!(selection.lock().is_selected(&p([0, 2])));

        tree.remove(&p([0]));
        {
            let selection = selection.lock();
            assert_eq!(selection.selected_indexes(), vec![p([0])]);
            assert_eq!(
                selection.selected_items().first().map(|item| item.data()),
                Some("Music".to_string())
            );
        }

        tree.clear();
        assert_eq!(selection.lock().count(), 0);
    }
}
