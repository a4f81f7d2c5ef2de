//! Hierarchical selection for Horizon TreeSelect.
//!
//! This module tracks which items of a tree-shaped source are selected. Items
//! are addressed by [`IndexPath`], the chain of child positions from the root,
//! and selected sibling positions are stored as sorted closed ranges so large
//! contiguous selections stay small.
//!
//! # Core Types
//!
//! - `IndexPath`: Identifies an item's position in the tree
//! - `IndexRange` / `IndexRangeList`: Canonical sets of sibling indices
//! - `IndexRanges`: Sets of paths grouped by parent
//! - `SelectionNode`: One level of the selection tree
//! - `PendingOperation`: The uncommitted effect of a batch
//! - `SelectionModel`: The public selection API
//!
//! # Item Sources
//!
//! - `ItemsView`: A counted, indexed view over one level of items
//! - `ChildrenAccessor`: Resolves an item to the view of its children
//! - `TreeModel`: A ready-made in-memory tree that drives an attached selection
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_treeselect::model::{IndexPath, ItemsViewRef, SelectionModel};
//!
//! let items: ItemsViewRef<&str> = Arc::new(vec!["a", "b", "c", "d"]);
//! let mut selection = SelectionModel::builder()
//!     .single_select(false)
//!     .source(items)
//!     .build();
//!
//! selection.signals().selection_changed.connect(|args| {
//!     println!("selected {}", args.selected_indexes);
//! });
//!
//! selection.select(&IndexPath::from([1]));
//! selection.select(&IndexPath::from([3]));
//!
//! // One item was inserted before both selected items.
//! selection.items_inserted(&IndexPath::unset(), 0, 1);
//! assert_eq!(
//!     selection.selected_indexes(),
//!     vec![IndexPath::from([2]), IndexPath::from([4])]
//! );
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────┐ items_inserted  ┌────────────────┐ selection_changed ┌─────────┐
//! │  Item source │ items_removed   │ SelectionModel │ property_changed  │  View   │
//! │  (ItemsView) │────────────────>│                │──────────────────>│         │
//! └──────────────┘ on_source_reset └────────────────┘                   └─────────┘
//!                                     │         │
//!                        ┌────────────┘         └───────────┐
//!                 ┌──────────────┐               ┌──────────────────┐
//!                 │ SelectionNode│               │ PendingOperation │
//!                 │  (committed) │               │    (batched)     │
//!                 └──────────────┘               └──────────────────┘
//! ```
//!
//! Mutations always run inside a batch. Nested batches share one pending
//! operation, and closing the outermost one commits it and publishes a single
//! notification.

mod events;
mod index_path;
mod index_range;
mod index_ranges;
mod operation;
pub mod selection;
mod selection_node;
pub mod source;
mod tree_model;

pub use events::{
    IndexesChangedArgs, SelectionChangedArgs, SelectionPathsChangedArgs, SelectionProperty,
    SelectionSignals,
};
pub use index_path::IndexPath;
pub use index_range::{IndexRange, IndexRangeList, total_len};
pub use index_ranges::IndexRanges;
pub use operation::PendingOperation;
pub use selection::{BatchUpdate, SelectionConfig, SelectionModel, SelectionModelBuilder};
pub use selection_node::{RemovedSelection, SelectionNode};
pub use source::{
    ChildrenAccessor, ItemsView, ItemsViewRef, children_accessor, try_get_children_at,
    try_get_item_at,
};
pub use tree_model::{NodeId, TreeItem, TreeModel, TreeModelSignals, TreeNode};
