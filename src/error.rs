//! Error types.

use std::io;

use thiserror::Error;

/// Result type for tree operations.
pub type Result<T> = std::result::Result<T, AllocationError>;

/// Memory for a new element could not be obtained.
///
/// Insertion is atomic: when this error is returned the tree is exactly as it
/// was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// The copy of the inserted key could not be allocated.
    #[error("cannot allocate {len} bytes for key copy")]
    Key {
        /// Length of the key in bytes.
        len: usize,
    },

    /// The tree node could not be allocated.
    #[error("cannot allocate tree node")]
    Node,
}

/// Errors raised while loading keys from an input source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the input failed.
    #[error("cannot read input")]
    Io(#[from] io::Error),

    /// A key could not be inserted.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}
