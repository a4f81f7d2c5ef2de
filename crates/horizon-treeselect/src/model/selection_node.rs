//! Sparse mirror of the item tree holding committed selection state.
//!
//! The mirror only materializes nodes on the way to selected items. A node
//! records which of its item's children are selected as an
//! [`IndexRangeList`], and keeps child nodes only for children that have
//! selected descendants. Memory is bounded by the size of the selection, not
//! the size of the tree.

use std::ops::ControlFlow;

use horizon_treeselect_core::DebugTreeNode;

use super::index_path::IndexPath;
use super::index_range::{IndexRange, IndexRangeList};
use super::operation::PendingOperation;
use super::source::{ChildrenAccessor, ItemsViewRef};

/// Selection removed together with a window of items.
#[derive(Debug)]
pub struct RemovedSelection<T> {
    /// Selected paths that were inside the window, in document order and in
    /// their positions before the removal.
    pub paths: Vec<IndexPath>,
    /// The items those paths pointed at, where they could be resolved.
    pub items: Vec<T>,
}

impl<T> Default for RemovedSelection<T> {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            items: Vec::new(),
        }
    }
}

/// One node of the selection mirror tree.
pub struct SelectionNode<T> {
    path: IndexPath,
    ranges: IndexRangeList,
    children: Vec<Option<SelectionNode<T>>>,
    items: Option<ItemsViewRef<T>>,
}

impl<T: Clone> SelectionNode<T> {
    /// Creates the root node over `items`.
    pub fn root(items: Option<ItemsViewRef<T>>) -> Self {
        Self::new(IndexPath::unset(), items)
    }

    fn new(path: IndexPath, items: Option<ItemsViewRef<T>>) -> Self {
        Self {
            path,
            ranges: IndexRangeList::new(),
            children: Vec::new(),
            items,
        }
    }

    /// Path of the item this node mirrors.
    #[inline]
    pub fn path(&self) -> &IndexPath {
        &self.path
    }

    /// Selected children of this node's item.
    #[inline]
    pub fn ranges(&self) -> &IndexRangeList {
        &self.ranges
    }

    /// View over this node's item's children.
    pub fn items(&self) -> Option<&ItemsViewRef<T>> {
        self.items.as_ref()
    }

    pub(crate) fn set_items(&mut self, items: Option<ItemsViewRef<T>>) {
        self.items = items;
    }

    /// Existing child node for sibling `index`.
    pub fn child(&self, index: usize) -> Option<&SelectionNode<T>> {
        self.children.get(index).and_then(Option::as_ref)
    }

    /// Number of child slots, materialized or not.
    pub fn child_slot_count(&self) -> usize {
        self.children.len()
    }

    /// Returns the child node for sibling `index`, creating it on first use.
    ///
    /// Returns `None` when this node has no items view or `index` is past the
    /// end of it.
    pub fn get_or_create_child(
        &mut self,
        index: usize,
        children: Option<&ChildrenAccessor<T>>,
    ) -> Option<&mut SelectionNode<T>> {
        let exists = self.child(index).is_some();
        if !exists {
            let view = self.items.as_ref()?;
            if index >= view.count() {
                return None;
            }
            let item = view.item_at(index)?;
            let child_items = children.and_then(|accessor| accessor(&item));
            if self.children.len() <= index {
                self.children.resize_with(index + 1, || None);
            }
            self.children[index] = Some(SelectionNode::new(
                self.path.clone_with_child_index(index),
                child_items,
            ));
        }
        self.children.get_mut(index).and_then(Option::as_mut)
    }

    /// The node at `path`, if materialized.
    pub fn get_node(&self, path: &IndexPath) -> Option<&SelectionNode<T>> {
        let mut node = self;
        for index in path.iter() {
            node = node.child(index)?;
        }
        Some(node)
    }

    /// The node at `path`, if materialized, mutably.
    pub fn get_node_mut(&mut self, path: &IndexPath) -> Option<&mut SelectionNode<T>> {
        let mut node = self;
        for index in path.iter() {
            node = node.children.get_mut(index).and_then(Option::as_mut)?;
        }
        Some(node)
    }

    /// The node at `path`, materializing every node on the way.
    pub fn get_or_create_node(
        &mut self,
        path: &IndexPath,
        children: Option<&ChildrenAccessor<T>>,
    ) -> Option<&mut SelectionNode<T>> {
        let mut node = self;
        for index in path.iter() {
            node = node.get_or_create_child(index, children)?;
        }
        Some(node)
    }

    /// Selects `range` at this level, returning the newly selected parts.
    pub fn commit_select(&mut self, range: IndexRange) -> Vec<IndexRange> {
        self.ranges.add(range)
    }

    /// Deselects `range` at this level, returning the parts that were selected.
    pub fn commit_deselect(&mut self, range: IndexRange) -> Vec<IndexRange> {
        self.ranges.remove(range)
    }

    /// Records a deselect of everything selected under this node.
    ///
    /// Pending selections beneath this node are dropped as well. The tree
    /// itself is only emptied by the commit that follows.
    pub fn clear(&self, operation: &mut PendingOperation<T>) {
        operation.selected.clear_under(&self.path);
        self.record_deselect_all(operation);
    }

    fn record_deselect_all(&self, operation: &mut PendingOperation<T>) {
        if !self.ranges.is_empty() {
            operation.deselected.add_list(&self.path, &self.ranges);
        }
        for child in self.children.iter().flatten() {
            child.record_deselect_all(operation);
        }
    }

    /// Returns `true` if this node holds no selection and no child nodes.
    pub fn is_prunable(&self) -> bool {
        self.ranges.is_empty() && self.children.is_empty()
    }

    /// Drops child nodes that no longer hold any selection.
    pub fn prune(&mut self) {
        for slot in &mut self.children {
            if let Some(child) = slot {
                child.prune();
                if child.is_prunable() {
                    *slot = None;
                }
            }
        }
        while matches!(self.children.last(), Some(None)) {
            self.children.pop();
        }
    }

    /// Drops all selection and child nodes, keeping the items view.
    pub fn reset(&mut self) {
        self.ranges.clear();
        self.children.clear();
    }

    /// Re-keys this node's children after a sibling shift.
    ///
    /// See [`IndexRangeList::shift`] for the meaning of `from` and `delta`.
    /// Child nodes inside a vacated window are dropped. Returns the selected
    /// ranges that were dropped.
    pub fn shift(&mut self, from: usize, delta: isize) -> Vec<IndexRange> {
        if delta == 0 {
            return Vec::new();
        }
        let dropped = self.ranges.shift(from, delta);
        let amount = delta.unsigned_abs();

        if delta > 0 {
            if from < self.children.len() {
                let tail = self.children.split_off(from);
                self.children.extend(std::iter::repeat_with(|| None).take(amount));
                self.children.extend(tail);
            }
        } else {
            let begin = from.saturating_sub(amount).min(self.children.len());
            let end = from.max(amount).min(self.children.len());
            self.children.drain(begin..end);
        }

        let first_moved = if delta > 0 { from } else { from.saturating_sub(amount) };
        for (index, slot) in self.children.iter_mut().enumerate().skip(first_moved) {
            if let Some(child) = slot {
                child.set_path(self.path.clone_with_child_index(index));
            }
        }
        while matches!(self.children.last(), Some(None)) {
            self.children.pop();
        }
        dropped
    }

    fn set_path(&mut self, path: IndexPath) {
        for (index, slot) in self.children.iter_mut().enumerate() {
            if let Some(child) = slot {
                child.set_path(path.clone_with_child_index(index));
            }
        }
        self.path = path;
    }

    /// Detaches the selection inside the sibling window `[start, start + count)`.
    ///
    /// `removed_items` holds the items that were in the window, in order;
    /// selected descendants are resolved through the detached child nodes'
    /// own views. Indices after the window are left in place; callers follow
    /// up with a negative [`shift`](Self::shift).
    pub fn take_removed(
        &mut self,
        start: usize,
        count: usize,
        removed_items: &[T],
    ) -> RemovedSelection<T> {
        let mut removed = RemovedSelection::default();
        let Some(window) = IndexRange::with_count(start, count) else {
            return removed;
        };

        let leaves = self.ranges.remove(window);
        let mut subtrees = Vec::new();
        let slots_end = window.end().saturating_add(1).min(self.children.len());
        if start < slots_end {
            for slot in &mut self.children[start..slots_end] {
                if let Some(child) = slot.take() {
                    subtrees.push(child);
                }
            }
        }

        let mut entries: Vec<(IndexPath, Option<T>)> = Vec::new();
        for index in leaves.iter().flat_map(IndexRange::indices) {
            let item = removed_items.get(index - start).cloned();
            entries.push((self.path.clone_with_child_index(index), item));
        }
        for subtree in &subtrees {
            let _ = subtree.try_visit_selected_items(&mut |path, item| {
                entries.push((path, item));
                ControlFlow::<()>::Continue(())
            });
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (path, item) in entries {
            removed.paths.push(path);
            removed.items.extend(item);
        }
        removed
    }

    /// Visits every selected path under this node in document order.
    ///
    /// The visit stops early when `visit` returns `ControlFlow::Break`.
    pub fn try_visit_selected<B>(
        &self,
        visit: &mut impl FnMut(IndexPath) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        let mut leaves = self.ranges.indices().peekable();
        for (index, slot) in self.children.iter().enumerate() {
            let Some(child) = slot else { continue };
            while let Some(&leaf) = leaves.peek() {
                if leaf > index {
                    break;
                }
                visit(self.path.clone_with_child_index(leaf))?;
                leaves.next();
            }
            child.try_visit_selected(visit)?;
        }
        for leaf in leaves {
            visit(self.path.clone_with_child_index(leaf))?;
        }
        ControlFlow::Continue(())
    }

    /// Like [`try_visit_selected`](Self::try_visit_selected), also passing the
    /// item each path resolves to through this subtree's views.
    fn try_visit_selected_items<B>(
        &self,
        visit: &mut impl FnMut(IndexPath, Option<T>) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        for leaf in self.ranges.indices() {
            let item = self.items.as_ref().and_then(|view| view.item_at(leaf));
            visit(self.path.clone_with_child_index(leaf), item)?;
        }
        for child in self.children.iter().flatten() {
            child.try_visit_selected_items(visit)?;
        }
        ControlFlow::Continue(())
    }

    /// Every selected path under this node, in document order.
    pub fn selected_paths(&self) -> Vec<IndexPath> {
        let mut paths = Vec::new();
        let _ = self.try_visit_selected(&mut |path| {
            paths.push(path);
            ControlFlow::<()>::Continue(())
        });
        paths
    }

    /// First selected path in document order.
    pub fn first_selected(&self) -> Option<IndexPath> {
        self.nth_selected(0)
    }

    /// Selected path at ordinal position `n` in document order.
    pub fn nth_selected(&self, n: usize) -> Option<IndexPath> {
        let mut remaining = n;
        match self.try_visit_selected(&mut |path| {
            if remaining == 0 {
                ControlFlow::Break(path)
            } else {
                remaining -= 1;
                ControlFlow::Continue(())
            }
        }) {
            ControlFlow::Break(path) => Some(path),
            ControlFlow::Continue(()) => None,
        }
    }

    /// Number of selected paths under this node.
    pub fn selected_count(&self) -> usize {
        self.ranges.count()
            + self
                .children
                .iter()
                .flatten()
                .map(SelectionNode::selected_count)
                .sum::<usize>()
    }

    /// Returns `true` if `path` is selected in the committed state.
    pub fn is_selected(&self, path: &IndexPath) -> bool {
        let Some(leaf) = path.leaf() else {
            return false;
        };
        self.get_node(&path.parent())
            .is_some_and(|node| node.ranges.contains(leaf))
    }
}

impl<T: Clone> DebugTreeNode for SelectionNode<T> {
    fn label(&self) -> String {
        if self.path.is_unset() {
            "root".to_string()
        } else {
            self.path.to_string()
        }
    }

    fn details(&self) -> Vec<String> {
        let mut details = vec![format!("selected: {}", self.ranges)];
        if let Some(view) = &self.items {
            details.push(format!("items: {}", view.count()));
        }
        details
    }

    fn children(&self) -> Vec<&dyn DebugTreeNode> {
        self.children
            .iter()
            .flatten()
            .map(|child| child as &dyn DebugTreeNode)
            .collect()
    }
}

impl<T> std::fmt::Debug for SelectionNode<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionNode")
            .field("path", &self.path)
            .field("ranges", &self.ranges)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}
