//! Observable values with change detection.
//!
//! A [`Property`] does not notify anyone by itself. Its [`set`](Property::set)
//! reports whether the stored value changed, and the owner decides which
//! notification to emit. Selection models keep `selected_index`,
//! `anchor_index` and `single_select` this way so a commit can emit one
//! property-changed notification per value that actually moved.
//!
//! ```
//! use horizon_treeselect_core::{Property, Signal};
//!
//! let anchor = Property::new(0usize);
//! let anchor_changed = Signal::<usize>::new();
//!
//! for row in [3, 3, 5] {
//!     if anchor.set(row) {
//!         anchor_changed.emit(row);
//!     }
//! }
//! assert_eq!(anchor.get(), 5);
//! ```

use std::fmt;

use parking_lot::RwLock;

use crate::logging::targets;

/// A value behind a lock whose writes report whether they changed it.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Creates a property holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Returns a copy of the value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Reads the value in place.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Stores `value`; returns `true` if it differs from the previous value.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current == value {
            return false;
        }
        *current = value;
        tracing::trace!(target: targets::PROPERTY, "value changed");
        true
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&*self.value.read()).finish()
    }
}
