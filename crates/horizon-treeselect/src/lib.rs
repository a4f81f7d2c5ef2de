//! Horizon TreeSelect - Hierarchical selection tracking for tree views.
//!
//! This is the main crate that re-exports the core systems alongside the
//! selection model.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_treeselect::model::{IndexPath, ItemsViewRef, SelectionModel};
//!
//! let items: ItemsViewRef<i32> = Arc::new(vec![10, 20, 30]);
//! let mut selection = SelectionModel::new();
//! selection.set_source(Some(items));
//! selection.select(&IndexPath::from([1]));
//!
//! assert_eq!(selection.selected_item(), Some(20));
//! ```

pub use horizon_treeselect_core::*;

pub mod model;
