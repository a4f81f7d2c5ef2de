//! Core systems for Horizon TreeSelect.
//!
//! This crate provides the foundational pieces shared by the selection model
//! and its item sources:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Property System**: Values that report whether a write changed them
//! - **Errors**: The [`SelectionError`] taxonomy and [`Result`] alias
//! - **Logging**: Tracing targets, perf spans and tree debug output
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_treeselect_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod property;
pub mod signal;

pub use error::{Result, SelectionError};
pub use logging::{DebugTreeNode, PerfSpan, TreeDebugFormatter, TreeFormatOptions, TreeStyle};
pub use property::Property;
pub use signal::{ConnectionId, Signal};
