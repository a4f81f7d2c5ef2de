//! Selection model for hierarchical item sources.
//!
//! This module provides [`SelectionModel`], which tracks which items of a
//! tree are selected, the primary selected path and the anchor path for range
//! extension.
//!
//! # Batches
//!
//! Every mutation runs inside a batch. Calls accumulate a
//! [`PendingOperation`]; closing the outermost batch commits its net effect
//! and publishes a single `selection_changed` notification. Batches nest:
//!
//! ```
//! use std::sync::Arc;
//! use horizon_treeselect::model::{IndexPath, ItemsViewRef, SelectionModel};
//!
//! let items: ItemsViewRef<&str> = Arc::new(vec!["a", "b", "c"]);
//! let mut selection = SelectionModel::builder()
//!     .single_select(false)
//!     .source(items)
//!     .build();
//!
//! {
//!     let mut batch = selection.batch_update();
//!     batch.select(&IndexPath::from([0]));
//!     batch.select(&IndexPath::from([2]));
//! } // one notification here
//!
//! assert_eq!(selection.count(), 2);
//! assert_eq!(selection.selected_index(), IndexPath::from([0]));
//! assert_eq!(selection.selected_items(), vec!["a", "c"]);
//! ```
//!
//! # Structural changes
//!
//! The model does not observe its source. Whoever edits the source reports
//! the edit through [`SelectionModel::items_inserted`],
//! [`SelectionModel::items_removed`] and [`SelectionModel::on_source_reset`]
//! (or the lower-level [`SelectionModel::on_indexes_shifted`] and
//! [`SelectionModel::on_selection_removed`]) so stored paths stay correct.

use std::fmt;
use std::ops::{ControlFlow, Deref, DerefMut};

use horizon_treeselect_core::logging::targets;
use horizon_treeselect_core::{PerfSpan, Property, Result, SelectionError, TreeDebugFormatter};

use super::events::{IndexesChangedArgs, SelectionChangedArgs, SelectionProperty, SelectionSignals};
use super::index_path::IndexPath;
use super::index_range::IndexRange;
use super::index_ranges::IndexRanges;
use super::operation::PendingOperation;
use super::selection_node::{RemovedSelection, SelectionNode};
use super::source::{self, ChildrenAccessor, ItemsViewRef};

/// Configuration for creating a [`SelectionModel`].
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Whether at most one path may be selected at a time.
    pub single_select: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            single_select: true,
        }
    }
}

impl SelectionConfig {
    /// Configuration allowing any number of selected paths.
    pub fn multiple() -> Self {
        Self {
            single_select: false,
        }
    }
}

/// Builder for creating selection models with custom configuration.
pub struct SelectionModelBuilder<T> {
    config: SelectionConfig,
    source: Option<ItemsViewRef<T>>,
    children: Option<ChildrenAccessor<T>>,
}

impl<T> Default for SelectionModelBuilder<T> {
    fn default() -> Self {
        Self {
            config: SelectionConfig::default(),
            source: None,
            children: None,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> SelectionModelBuilder<T> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SelectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set whether at most one path may be selected.
    pub fn single_select(mut self, single_select: bool) -> Self {
        self.config.single_select = single_select;
        self
    }

    /// Set the root items view.
    pub fn source(mut self, source: ItemsViewRef<T>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the accessor that resolves an item's children.
    pub fn children(mut self, children: ChildrenAccessor<T>) -> Self {
        self.children = Some(children);
        self
    }

    /// Build the selection model.
    pub fn build(self) -> SelectionModel<T> {
        let mut model = SelectionModel::with_config(self.config);
        model.children = self.children;
        model.root.set_items(self.source);
        model
    }
}

/// Tracks the selected items of a tree addressed by [`IndexPath`]s.
///
/// Committed selection lives in a sparse [`SelectionNode`] mirror of the
/// item tree. After every commit a set `selected_index` is itself selected,
/// and with `single_select` at most one path is selected.
///
/// # Signals
///
/// See [`SelectionSignals`]. Listeners run synchronously on commit and must
/// not call back into the model that emitted.
pub struct SelectionModel<T> {
    root: SelectionNode<T>,
    children: Option<ChildrenAccessor<T>>,
    selected_index: Property<IndexPath>,
    anchor_index: Property<IndexPath>,
    single_select: Property<bool>,
    operation: Option<PendingOperation<T>>,
    signals: SelectionSignals<T>,
}

impl<T: Clone + Send + Sync + 'static> Default for SelectionModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> SelectionModel<T> {
    /// Creates a single-select model with no source.
    pub fn new() -> Self {
        Self::with_config(SelectionConfig::default())
    }

    /// Creates a model with no source from a configuration.
    pub fn with_config(config: SelectionConfig) -> Self {
        Self {
            root: SelectionNode::root(None),
            children: None,
            selected_index: Property::default(),
            anchor_index: Property::default(),
            single_select: Property::new(config.single_select),
            operation: None,
            signals: SelectionSignals::new(),
        }
    }

    /// Returns a builder for configuring a new model.
    pub fn builder() -> SelectionModelBuilder<T> {
        SelectionModelBuilder::new()
    }

    /// The signals emitted by this model.
    pub fn signals(&self) -> &SelectionSignals<T> {
        &self.signals
    }

    // =========================================================================
    // Source
    // =========================================================================

    /// The root items view.
    pub fn source(&self) -> Option<&ItemsViewRef<T>> {
        self.root.items()
    }

    /// The accessor resolving an item's children.
    pub fn children(&self) -> Option<&ChildrenAccessor<T>> {
        self.children.as_ref()
    }

    /// Replaces the root items view.
    ///
    /// Every selected path is reported as removed, together with the item it
    /// pointed at in the old view. The primary and anchor paths are unset.
    pub fn set_source(&mut self, source: Option<ItemsViewRef<T>>) {
        {
            let mut batch = self.batch_update();
            batch.replace_source(source);
        }
        self.signals.property_changed.emit(SelectionProperty::Source);
    }

    fn replace_source(&mut self, source: Option<ItemsViewRef<T>>) {
        let paths = self.root.selected_paths();
        let items = paths
            .iter()
            .filter_map(|path| self.try_get_item_at(path))
            .collect();
        tracing::debug!(target: targets::SOURCE, dropped = paths.len(), "source replaced");

        self.root.reset();
        self.root.set_items(source);
        if let Some(op) = self.operation.as_mut() {
            op.record_removed(RemovedSelection { paths, items });
            op.selected.clear();
            op.deselected.clear();
            op.selected_index = IndexPath::unset();
            op.anchor_index = IndexPath::unset();
        }
    }

    /// Resolves the item at `path` against the current source.
    pub fn try_get_item_at(&self, path: &IndexPath) -> Option<T> {
        source::try_get_item_at(self.root.items(), self.children.as_ref(), path)
    }

    // =========================================================================
    // Selection Mode
    // =========================================================================

    /// Whether at most one path may be selected.
    pub fn single_select(&self) -> bool {
        self.single_select.get()
    }

    /// Sets single-selection mode.
    ///
    /// Switching it on while several paths are selected collapses the
    /// selection to the primary path (or the first selected path if there is
    /// no primary). Selections still pending in an open batch collapse the
    /// same way when it commits.
    pub fn set_single_select(&mut self, single_select: bool) {
        if !self.single_select.set(single_select) {
            return;
        }
        if single_select && self.count() > 1 {
            let keep = match self.selected_index.get() {
                path if path.is_unset() => self.root.first_selected().unwrap_or_default(),
                path => path,
            };
            let mut batch = self.batch_update();
            batch.clear_inner();
            if !keep.is_unset() {
                batch.select_inner(&keep);
            }
        }
        self.signals
            .property_changed
            .emit(SelectionProperty::SingleSelect);
    }

    // =========================================================================
    // Primary and Anchor
    // =========================================================================

    /// The primary selected path, unset when there is none.
    pub fn selected_index(&self) -> IndexPath {
        self.selected_index.get()
    }

    /// Replaces the selection with `path` alone.
    ///
    /// An unset or unresolvable path just clears the selection.
    pub fn set_selected_index(&mut self, path: IndexPath) {
        let mut batch = self.batch_update();
        batch.clear_inner();
        if !path.is_unset() {
            batch.select_inner(&path);
        }
    }

    /// The item at the primary selected path.
    pub fn selected_item(&self) -> Option<T> {
        self.selected_index.with(|path| self.try_get_item_at(path))
    }

    /// The pivot path for range extension.
    pub fn anchor_index(&self) -> IndexPath {
        self.anchor_index.get()
    }

    /// Moves the anchor without changing the selection.
    pub fn set_anchor_index(&mut self, anchor: IndexPath) {
        let mut batch = self.batch_update();
        if let Some(op) = batch.operation.as_mut() {
            op.anchor_index = anchor;
        }
    }

    // =========================================================================
    // Selection Queries
    // =========================================================================

    /// Returns `true` if `path` is selected in the committed state.
    ///
    /// Pending changes of an open batch are not visible here.
    pub fn is_selected(&self, path: &IndexPath) -> bool {
        self.root.is_selected(path)
    }

    /// Number of selected paths.
    pub fn count(&self) -> usize {
        self.root.selected_count()
    }

    /// Selected path at position `n` in document order.
    pub fn selected_index_at(&self, n: usize) -> Option<IndexPath> {
        self.root.nth_selected(n)
    }

    /// Every selected path, in document order.
    pub fn selected_indexes(&self) -> Vec<IndexPath> {
        self.root.selected_paths()
    }

    /// Items behind every selected path, in document order.
    ///
    /// Paths that no longer resolve are skipped.
    pub fn selected_items(&self) -> Vec<T> {
        self.root
            .selected_paths()
            .iter()
            .filter_map(|path| self.try_get_item_at(path))
            .collect()
    }

    /// The root of the selection mirror tree.
    pub fn root_node(&self) -> &SelectionNode<T> {
        &self.root
    }

    /// Renders the selection mirror tree for diagnostics.
    pub fn debug_tree(&self) -> String {
        TreeDebugFormatter::new().format(&self.root)
    }

    // =========================================================================
    // Selection Operations
    // =========================================================================

    /// Selects `path`.
    ///
    /// In single-select mode the previous selection is cleared. The path
    /// becomes the anchor, and the primary path if none is set. Paths that do
    /// not resolve to an item are ignored.
    pub fn select(&mut self, path: &IndexPath) {
        let mut batch = self.batch_update();
        batch.select_inner(path);
    }

    /// Deselects `path` if it is selected.
    ///
    /// If it was the primary path, the first remaining selected path in
    /// document order becomes primary.
    pub fn deselect(&mut self, path: &IndexPath) {
        let mut batch = self.batch_update();
        batch.deselect_inner(path);
    }

    /// Deselects everything and unsets the primary path.
    pub fn clear(&mut self) {
        let mut batch = self.batch_update();
        batch.clear_inner();
    }

    fn select_inner(&mut self, path: &IndexPath) {
        if path.is_unset() || self.try_get_item_at(path).is_none() {
            tracing::debug!(target: targets::SELECTION, %path, "ignoring select of a path that does not resolve");
            return;
        }
        if self.single_select.get() {
            self.clear_inner();
        }
        let Some(op) = self.operation.as_mut() else {
            return;
        };
        op.select_path(path);
        if op.selected_index.is_unset() {
            op.selected_index = path.clone();
        }
        op.anchor_index = path.clone();
        tracing::trace!(target: targets::SELECTION, %path, "select");
    }

    fn deselect_inner(&mut self, path: &IndexPath) {
        let committed = self.root.is_selected(path);
        let Some(op) = self.operation.as_mut() else {
            return;
        };
        let selected = (committed || op.is_pending_select(path)) && !op.is_pending_deselect(path);
        if !selected {
            tracing::trace!(target: targets::SELECTION, %path, "ignoring deselect of an unselected path");
            return;
        }
        op.deselect_path(path);
        tracing::trace!(target: targets::SELECTION, %path, "deselect");

        if op.selected_index == *path {
            let next = self.first_remaining_selected().unwrap_or_default();
            if let Some(op) = self.operation.as_mut() {
                op.selected_index = next;
            }
        }
    }

    fn clear_inner(&mut self) {
        let Some(op) = self.operation.as_mut() else {
            return;
        };
        self.root.clear(op);
        op.selected_index = IndexPath::unset();
    }

    /// First path, in document order, that will be selected once the open
    /// batch commits.
    fn first_remaining_selected(&self) -> Option<IndexPath> {
        let Some(op) = self.operation.as_ref() else {
            return self.root.first_selected();
        };
        let committed = match self.root.try_visit_selected(&mut |path| {
            if op.is_pending_deselect(&path) {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(path)
            }
        }) {
            ControlFlow::Break(path) => Some(path),
            ControlFlow::Continue(()) => None,
        };
        let pending = op.selected.paths().into_iter().next();
        match (committed, pending) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // =========================================================================
    // Batches
    // =========================================================================

    /// Opens a batch, or joins the one already open.
    pub fn begin_batch_update(&mut self) {
        match self.operation.as_mut() {
            Some(op) => {
                let depth = op.enter();
                tracing::trace!(target: targets::BATCH, depth, "batch nested");
            }
            None => {
                self.operation = Some(PendingOperation::new(
                    self.selected_index.get(),
                    self.anchor_index.get(),
                ));
                tracing::trace!(target: targets::BATCH, "batch opened");
            }
        }
    }

    /// Closes a batch, committing when the outermost one closes.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::BatchNotStarted`] if no batch is open.
    pub fn end_batch_update(&mut self) -> Result<()> {
        let op = self
            .operation
            .as_mut()
            .ok_or(SelectionError::BatchNotStarted)?;
        if op.exit() {
            if let Some(op) = self.operation.take() {
                self.commit(op);
            }
        } else {
            tracing::trace!(target: targets::BATCH, depth = op.depth(), "batch unnested");
        }
        Ok(())
    }

    /// Returns `true` while a batch is open.
    pub fn is_batch_in_progress(&self) -> bool {
        self.operation.is_some()
    }

    /// The pending operation of the open batch.
    pub fn pending_operation(&self) -> Option<&PendingOperation<T>> {
        self.operation.as_ref()
    }

    /// Opens a batch that closes when the returned guard is dropped.
    ///
    /// The guard dereferences to the model.
    pub fn batch_update(&mut self) -> BatchUpdate<'_, T> {
        self.begin_batch_update();
        BatchUpdate { model: self }
    }

    fn commit(&mut self, operation: PendingOperation<T>) {
        let _span = PerfSpan::new("selection_commit");
        let children = self.children.clone();

        let mut selected = IndexRanges::new();
        for (parent, list) in operation.selected.iter() {
            let Some(node) = self.root.get_or_create_node(parent, children.as_ref()) else {
                tracing::debug!(target: targets::BATCH, %parent, "dropping selection under a parent that no longer resolves");
                continue;
            };
            for range in list {
                for added in node.commit_select(*range) {
                    selected.add_range(parent.clone(), added);
                }
            }
        }

        let mut deselected = IndexRanges::new();
        for (parent, list) in operation.deselected.iter() {
            let Some(node) = self.root.get_node_mut(parent) else {
                continue;
            };
            for range in list {
                for removed in node.commit_deselect(*range) {
                    deselected.add_range(parent.clone(), removed);
                }
            }
        }
        if self.single_select.get() {
            self.collapse_to_single(&operation.selected_index, &mut selected, &mut deselected);
        }
        self.root.prune();

        let selected_items: Vec<T> = selected
            .paths()
            .iter()
            .filter_map(|path| self.try_get_item_at(path))
            .collect();
        let mut deselected_items: Vec<T> = deselected
            .paths()
            .iter()
            .filter_map(|path| self.try_get_item_at(path))
            .collect();
        deselected_items.extend(operation.removed_items);
        for (parent, list) in operation.removed.iter() {
            deselected.add_list(parent, list);
        }

        let mut selected_index = operation.selected_index;
        if !selected_index.is_unset() && !self.root.is_selected(&selected_index) {
            selected_index = self.root.first_selected().unwrap_or_default();
        }
        let index_changed = self.selected_index.set(selected_index);
        let anchor_changed = self.anchor_index.set(operation.anchor_index);
        let ranges_changed = !selected.is_empty() || !deselected.is_empty();

        tracing::debug!(
            target: targets::BATCH,
            selected = selected.count(),
            deselected = deselected.count(),
            index_changed,
            anchor_changed,
            "selection committed"
        );

        if ranges_changed {
            self.signals.publish_selection_changed(SelectionChangedArgs {
                deselected_indexes: deselected,
                selected_indexes: selected,
                deselected_items,
                selected_items,
            });
        }

        let properties = &self.signals.property_changed;
        if index_changed {
            properties.emit(SelectionProperty::SelectedIndex);
            properties.emit(SelectionProperty::SelectedItem);
        }
        if anchor_changed {
            properties.emit(SelectionProperty::AnchorIndex);
        }
        if index_changed || ranges_changed {
            properties.emit(SelectionProperty::SelectedIndexes);
            properties.emit(SelectionProperty::SelectedItems);
        }
        for parent in operation.reset_parents {
            self.signals.source_reset.emit(parent);
        }
    }

    /// Deselects every committed path except one.
    ///
    /// Keeps `preferred` when it is selected, otherwise the first selected
    /// path. Paths selected by the same commit are dropped from `selected`
    /// instead of being reported as deselected.
    fn collapse_to_single(
        &mut self,
        preferred: &IndexPath,
        selected: &mut IndexRanges,
        deselected: &mut IndexRanges,
    ) {
        if self.root.selected_count() <= 1 {
            return;
        }
        let keep = if self.root.is_selected(preferred) {
            preferred.clone()
        } else {
            self.root.first_selected().unwrap_or_default()
        };
        for path in self.root.selected_paths() {
            if path == keep {
                continue;
            }
            let Some(leaf) = path.leaf() else {
                continue;
            };
            let Some(node) = self.root.get_node_mut(&path.parent()) else {
                continue;
            };
            if node.commit_deselect(IndexRange::single(leaf)).is_empty() {
                continue;
            }
            if !selected.remove(&path) {
                deselected.add(&path);
            }
        }
        tracing::debug!(target: targets::BATCH, %keep, "collapsed selection for single-select");
    }

    // =========================================================================
    // Structural Changes
    // =========================================================================

    /// Re-keys stored paths after siblings under `parent` moved.
    ///
    /// Every stored path whose component at `parent.len()` is `>= from` moves
    /// by `delta`. A negative delta describes `-delta` siblings removed just
    /// before `from`; selection in that window should already have been
    /// reported through [`on_selection_removed`](Self::on_selection_removed).
    pub fn on_indexes_shifted(&mut self, parent: &IndexPath, from: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        let mut batch = self.batch_update();
        batch.shift_inner(parent, from, delta);
    }

    /// Takes the sibling window `[start, start + count)` under `parent` out of
    /// the selection.
    ///
    /// `removed_items` are the items that were in the window, in order.
    /// Selected paths inside the window are reported as deselected by the
    /// next commit, with their items. A primary or anchor path inside the
    /// window is unset. Indices after the window are not moved.
    pub fn on_selection_removed(
        &mut self,
        parent: &IndexPath,
        start: usize,
        count: usize,
        removed_items: &[T],
    ) {
        if count == 0 {
            return;
        }
        let mut batch = self.batch_update();
        batch.remove_inner(parent, start, count, removed_items);
    }

    /// Reports `count` items inserted under `parent` at `index`.
    pub fn items_inserted(&mut self, parent: &IndexPath, index: usize, count: usize) {
        match isize::try_from(count) {
            Ok(delta) => self.on_indexes_shifted(parent, index, delta),
            Err(_) => {
                tracing::warn!(target: targets::STRUCTURE, %parent, index, count, "insert count out of range");
            }
        }
    }

    /// Reports `count` items removed under `parent` at `index`.
    ///
    /// Combines [`on_selection_removed`](Self::on_selection_removed) with the
    /// shift of the siblings after the removed window.
    pub fn items_removed(
        &mut self,
        parent: &IndexPath,
        index: usize,
        count: usize,
        removed_items: &[T],
    ) {
        let Ok(delta) = isize::try_from(count) else {
            tracing::warn!(target: targets::STRUCTURE, %parent, index, count, "remove count out of range");
            return;
        };
        if count == 0 {
            return;
        }
        let mut batch = self.batch_update();
        batch.remove_inner(parent, index, count, removed_items);
        batch.shift_inner(parent, index.saturating_add(count), -delta);
    }

    /// Reports that every child of `parent` was replaced.
    ///
    /// Selection under `parent` is reported as removed; the items can no
    /// longer be resolved and are not reported. `source_reset` fires after
    /// the commit.
    pub fn on_source_reset(&mut self, parent: &IndexPath) {
        let view = source::try_get_children_at(self.root.items(), self.children.as_ref(), parent);
        let mut batch = self.batch_update();
        batch.reset_inner(parent, view);
    }

    fn shift_inner(&mut self, parent: &IndexPath, from: usize, delta: isize) {
        let Some(op) = self.operation.as_mut() else {
            return;
        };
        let amount = delta.unsigned_abs();
        let window_start = from.saturating_sub(amount);
        let window_count = from.max(amount) - window_start;

        if let Some(node) = self.root.get_node_mut(parent) {
            if delta < 0 {
                let stale = node.take_removed(window_start, window_count, &[]);
                if !stale.paths.is_empty() {
                    tracing::warn!(
                        target: targets::STRUCTURE,
                        %parent,
                        from,
                        delta,
                        count = stale.paths.len(),
                        "shift dropped selected items that were not reported removed"
                    );
                    op.record_removed(stale);
                }
            }
            node.shift(from, delta);
        }
        if delta < 0 {
            op.discard_window(parent, window_start, window_count);
        }
        op.shift(parent, from, delta);

        tracing::debug!(target: targets::STRUCTURE, %parent, from, delta, "indexes shifted");
        self.signals.indexes_changed.emit(IndexesChangedArgs {
            parent_index: parent.clone(),
            start_index: from,
            delta,
        });
    }

    fn remove_inner(&mut self, parent: &IndexPath, start: usize, count: usize, removed_items: &[T]) {
        let Some(op) = self.operation.as_mut() else {
            return;
        };
        if let Some(node) = self.root.get_node_mut(parent) {
            let removed = node.take_removed(start, count, removed_items);
            tracing::debug!(
                target: targets::STRUCTURE,
                %parent,
                start,
                count,
                selected = removed.paths.len(),
                "items removed"
            );
            op.record_removed(removed);
        }
        op.discard_window(parent, start, count);
    }

    fn reset_inner(&mut self, parent: &IndexPath, view: Option<ItemsViewRef<T>>) {
        let Some(op) = self.operation.as_mut() else {
            return;
        };
        if let Some(node) = self.root.get_node_mut(parent) {
            let paths = node.selected_paths();
            tracing::debug!(target: targets::STRUCTURE, %parent, dropped = paths.len(), "children reset");
            op.record_removed(RemovedSelection {
                paths,
                items: Vec::new(),
            });
            node.reset();
            node.set_items(view);
        }
        op.discard_under(parent);
        op.reset_parents.push(parent.clone());
    }
}

impl<T> fmt::Debug for SelectionModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionModel")
            .field("selected_index", &self.selected_index.get())
            .field("anchor_index", &self.anchor_index.get())
            .field("single_select", &self.single_select.get())
            .field("batch_depth", &self.operation.as_ref().map_or(0, |op| op.depth()))
            .finish_non_exhaustive()
    }
}

/// Scope guard returned by [`SelectionModel::batch_update`].
///
/// Dereferences to the model; the batch closes when the guard drops, on
/// every exit path.
pub struct BatchUpdate<'a, T: Clone + Send + Sync + 'static> {
    model: &'a mut SelectionModel<T>,
}

impl<T: Clone + Send + Sync + 'static> Deref for BatchUpdate<'_, T> {
    type Target = SelectionModel<T>;

    fn deref(&self) -> &Self::Target {
        self.model
    }
}

impl<T: Clone + Send + Sync + 'static> DerefMut for BatchUpdate<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.model
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for BatchUpdate<'_, T> {
    fn drop(&mut self) {
        if let Err(error) = self.model.end_batch_update() {
            tracing::warn!(target: targets::BATCH, %error, "batch guard closed an already closed batch");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    fn flat(count: usize) -> ItemsViewRef<String> {
        let items: Vec<String> = (0..count).map(|i| format!("item{i}")).collect();
        Arc::new(items)
    }

    fn multi(count: usize) -> SelectionModel<String> {
        SelectionModel::builder()
            .single_select(false)
            .source(flat(count))
            .build()
    }

    fn p<const N: usize>(indices: [usize; N]) -> IndexPath {
        IndexPath::from(indices)
    }

    fn count_changes(model: &SelectionModel<String>) -> Arc<Mutex<usize>> {
        let count = Arc::new(Mutex::new(0));
        let count_clone = count.clone();
        model.signals().selection_changed.connect(move |_| {
            *count_clone.lock() += 1;
        });
        count
    }

    #[test]
    fn test_default_is_single_select() {
        let model = SelectionModel::<String>::new();
        assert!(model.single_select());
        assert!(model.source().is_none());
        assert!(model.selected_index().is_unset());
    }

    #[test]
    fn test_select_sets_primary_and_anchor() {
        let mut model = multi(5);
        model.select(&p([2]));
        model.select(&p([4]));
        assert_eq!(model.selected_index(), p([2]));
        assert_eq!(model.anchor_index(), p([4]));
        assert_eq!(model.selected_item(), Some("item2".to_string()));
        assert_eq!(model.selected_indexes(), vec![p([2]), p([4])]);
    }

    #[test]
    fn test_single_select_replaces() {
        let mut model = SelectionModel::builder().source(flat(5)).build();
        model.select(&p([1]));
        model.select(&p([3]));
        assert_eq!(model.count(), 1);
        assert!(model.is_selected(&p([3])));
        assert_eq!(model.selected_index(), p([3]));
    }

    #[test]
    fn test_unresolvable_select_is_noop() {
        let mut model = multi(2);
        let changes = count_changes(&model);
        model.select(&p([5]));
        model.select(&p([0, 1]));
        model.select(&IndexPath::unset());
        assert_eq!(model.count(), 0);
        assert_eq!(*changes.lock(), 0);
    }

    #[test]
    fn test_deselect_moves_primary_forward() {
        let mut model = multi(5);
        model.select(&p([1]));
        model.select(&p([3]));
        model.deselect(&p([1]));
        assert_eq!(model.selected_index(), p([3]));
        model.deselect(&p([3]));
        assert!(model.selected_index().is_unset());
        assert_eq!(model.count(), 0);
    }

    #[test]
    fn test_deselect_unselected_publishes_nothing() {
        let mut model = multi(3);
        let changes = count_changes(&model);
        model.deselect(&p([1]));
        assert_eq!(*changes.lock(), 0);
    }

    #[test]
    fn test_deselect_skips_pending_deselections() {
        let mut model = multi(5);
        {
            let mut batch = model.batch_update();
            batch.select(&p([0]));
            batch.select(&p([1]));
            batch.select(&p([2]));
        }
        {
            let mut batch = model.batch_update();
            batch.deselect(&p([1]));
            batch.deselect(&p([0]));
        }
        assert_eq!(model.selected_index(), p([2]));
    }

    #[test]
    fn test_select_then_deselect_in_one_batch() {
        let mut model = multi(3);
        let changes = count_changes(&model);
        {
            let mut batch = model.batch_update();
            batch.select(&p([1]));
            batch.deselect(&p([1]));
        }
        assert!(!model.is_selected(&p([1])));
        assert_eq!(*changes.lock(), 0);

        {
            let mut batch = model.batch_update();
            batch.deselect(&p([2]));
            batch.select(&p([2]));
        }
        assert!(model.is_selected(&p([2])));
    }

    #[test]
    fn test_clear() {
        let mut model = multi(4);
        model.select(&p([0]));
        model.select(&p([2]));
        let payload = Arc::new(Mutex::new(None));
        let payload_clone = payload.clone();
        model.signals().selection_changed.connect(move |args| {
            *payload_clone.lock() = Some(args.clone());
        });

        model.clear();
        assert_eq!(model.count(), 0);
        assert!(model.selected_index().is_unset());
        let args = payload.lock().take().unwrap();
        assert_eq!(args.deselected_indexes.paths(), vec![p([0]), p([2])]);
        assert_eq!(args.deselected_items, vec!["item0".to_string(), "item2".to_string()]);
        assert!(args.selected_indexes.is_empty());
    }

    #[test]
    fn test_set_selected_index() {
        let mut model = multi(4);
        model.select(&p([0]));
        model.select(&p([1]));
        model.set_selected_index(p([3]));
        assert_eq!(model.selected_indexes(), vec![p([3])]);
        assert_eq!(model.selected_index(), p([3]));
    }

    #[test]
    fn test_set_single_select_collapses() {
        let mut model = multi(4);
        model.select(&p([1]));
        model.select(&p([2]));
        model.select(&p([3]));
        model.set_single_select(true);
        assert_eq!(model.selected_indexes(), vec![p([1])]);
        assert_eq!(model.selected_index(), p([1]));
    }

    #[test]
    fn test_set_anchor_index_keeps_selection() {
        let mut model = multi(4);
        model.select(&p([1]));
        model.set_anchor_index(p([3]));
        assert_eq!(model.anchor_index(), p([3]));
        assert_eq!(model.selected_indexes(), vec![p([1])]);
    }

    #[test]
    fn test_end_without_begin() {
        let mut model = multi(1);
        assert_eq!(model.end_batch_update(), Err(SelectionError::BatchNotStarted));
    }

    #[test]
    fn test_manual_batch_nesting() {
        let mut model = multi(3);
        let changes = count_changes(&model);
        model.begin_batch_update();
        model.begin_batch_update();
        model.select(&p([0]));
        model.end_batch_update().unwrap();
        assert!(model.is_batch_in_progress());
        assert!(!model.is_selected(&p([0])));
        model.select(&p([1]));
        model.end_batch_update().unwrap();
        assert!(!model.is_batch_in_progress());
        assert_eq!(model.count(), 2);
        assert_eq!(*changes.lock(), 1);
    }

    #[test]
    fn test_property_notifications() {
        let mut model = multi(3);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        model.signals().property_changed.connect(move |property| {
            seen_clone.lock().push(*property);
        });

        model.select(&p([0]));
        assert_eq!(
            *seen.lock(),
            vec![
                SelectionProperty::SelectedIndex,
                SelectionProperty::SelectedItem,
                SelectionProperty::AnchorIndex,
                SelectionProperty::SelectedIndexes,
                SelectionProperty::SelectedItems,
            ]
        );

        seen.lock().clear();
        model.select(&p([1]));
        assert_eq!(
            *seen.lock(),
            vec![
                SelectionProperty::AnchorIndex,
                SelectionProperty::SelectedIndexes,
                SelectionProperty::SelectedItems,
            ]
        );
    }

    #[test]
    fn test_set_source_reports_removed_items() {
        let mut model = multi(3);
        model.select(&p([1]));
        let payload = Arc::new(Mutex::new(None));
        let payload_clone = payload.clone();
        model.signals().selection_changed.connect(move |args| {
            *payload_clone.lock() = Some(args.clone());
        });

        model.set_source(Some(flat(10)));
        let args = payload.lock().take().unwrap();
        assert_eq!(args.deselected_indexes.paths(), vec![p([1])]);
        assert_eq!(args.deselected_items, vec!["item1".to_string()]);
        assert_eq!(model.count(), 0);
        assert!(model.selected_index().is_unset());
        assert!(model.anchor_index().is_unset());
        assert_eq!(model.source().map(|s| s.count()), Some(10));
    }

    #[test]
    fn test_debug_tree_renders_root() {
        let mut model = multi(3);
        model.select(&p([1]));
        let output = model.debug_tree();
        assert!(output.starts_with("root"));
        assert!(output.contains("selected: {1}"));
        assert!(format!("{model:?}").contains("SelectionModel"));
    }
}
