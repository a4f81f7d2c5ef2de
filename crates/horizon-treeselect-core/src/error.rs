//! Error types for Horizon TreeSelect.
//!
//! Only programming errors surface here. Paths that fail to resolve against
//! the item source are not errors: selection calls on them degrade to no-ops.

/// Result type alias for selection operations.
pub type Result<T> = std::result::Result<T, SelectionError>;

/// Errors that can occur while driving a selection model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// `end_batch_update` was called without a matching `begin_batch_update`.
    #[error("No batch update is in progress")]
    BatchNotStarted,

    /// A selection model is already attached to this item source.
    #[error("A selection model is already attached to this source")]
    AlreadyAttached,

    /// A path component was requested past the end of the path.
    #[error("Index {index} is out of range for a path of depth {depth}")]
    OutOfRange {
        /// The requested depth.
        index: usize,
        /// The depth of the path.
        depth: usize,
    },
}

impl SelectionError {
    /// Create an out-of-range error.
    pub fn out_of_range(index: usize, depth: usize) -> Self {
        Self::OutOfRange { index, depth }
    }

    /// Returns `true` for errors that indicate misuse of the API rather than
    /// bad input data.
    pub fn is_invalid_usage(&self) -> bool {
        matches!(self, Self::BatchNotStarted | Self::AlreadyAttached)
    }
}
