//! Item sources consumed by the selection model.
//!
//! A selection model never owns the items it selects. It reads them through
//! [`ItemsView`], one view per level of the tree, and finds the view for an
//! item's children through a [`ChildrenAccessor`]. Views are expected to be
//! live: a view kept by the model keeps reporting the current count after the
//! source is edited.

use std::sync::Arc;

use horizon_treeselect_core::logging::targets;

use super::index_path::IndexPath;

/// A read-only, indexable collection of items at one level of a tree.
///
/// # Example
///
/// ```
/// use horizon_treeselect::model::ItemsView;
///
/// let fruit = vec!["apple", "pear"];
/// assert_eq!(ItemsView::count(&fruit), 2);
/// assert_eq!(fruit.item_at(1), Some("pear"));
/// assert_eq!(fruit.item_at(2), None);
/// ```
pub trait ItemsView<T>: Send + Sync {
    /// Number of items at this level.
    fn count(&self) -> usize;

    /// The item at `index`, or `None` when out of range.
    fn item_at(&self, index: usize) -> Option<T>;
}

/// Shared handle to an items view.
pub type ItemsViewRef<T> = Arc<dyn ItemsView<T>>;

/// Returns the children view of an item, or `None` for items without children.
pub type ChildrenAccessor<T> = Arc<dyn Fn(&T) -> Option<ItemsViewRef<T>> + Send + Sync>;

impl<T: Clone + Send + Sync> ItemsView<T> for Vec<T> {
    fn count(&self) -> usize {
        self.len()
    }

    fn item_at(&self, index: usize) -> Option<T> {
        self.get(index).cloned()
    }
}

/// Wraps a closure as a [`ChildrenAccessor`].
pub fn children_accessor<T, F>(accessor: F) -> ChildrenAccessor<T>
where
    F: Fn(&T) -> Option<ItemsViewRef<T>> + Send + Sync + 'static,
{
    Arc::new(accessor)
}

/// Resolves the item at `path`, walking one level per component.
///
/// Returns `None` for the root path, when a component is out of range, or
/// when a level on the way has no children view.
pub fn try_get_item_at<T>(
    root: Option<&ItemsViewRef<T>>,
    children: Option<&ChildrenAccessor<T>>,
    path: &IndexPath,
) -> Option<T> {
    let (&leaf, ancestors) = path.as_slice().split_last()?;
    let view = descend(root?, children, ancestors)?;
    view.item_at(leaf)
}

/// Resolves the view holding the children of the item at `parent`.
///
/// The root path resolves to the root view itself.
pub fn try_get_children_at<T>(
    root: Option<&ItemsViewRef<T>>,
    children: Option<&ChildrenAccessor<T>>,
    parent: &IndexPath,
) -> Option<ItemsViewRef<T>> {
    descend(root?, children, parent.as_slice())
}

fn descend<T>(
    root: &ItemsViewRef<T>,
    children: Option<&ChildrenAccessor<T>>,
    indices: &[usize],
) -> Option<ItemsViewRef<T>> {
    let mut view = Arc::clone(root);
    for (depth, &index) in indices.iter().enumerate() {
        let Some(item) = view.item_at(index) else {
            tracing::trace!(target: targets::SOURCE, depth, index, "path component out of range");
            return None;
        };
        let accessor = children?;
        view = accessor(&item)?;
    }
    Some(view)
}
