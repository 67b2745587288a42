//! Error types for the marshaling engine.

use h5bridge_store::{ObjectKind, StoreError};

/// Why a requested sub-region could not be turned into a selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Offset and count must be given together or not at all.
    #[error("offset and count must be given together")]
    PartialRegion,

    /// The request's rank does not match the dataspace's rank.
    #[error("selection rank {actual} does not match dataspace rank {expected}")]
    RankMismatch { expected: usize, actual: usize },

    /// A dimension's offset+count exceeds its extent.
    #[error("dimension {dim}: offset {offset} + count {count} exceeds extent {extent}")]
    OutOfRange {
        dim: usize,
        offset: u64,
        count: u64,
        extent: u64,
    },
}

/// Errors surfaced by the engine.
///
/// Resolution and selection errors are detected before any native read
/// call; read errors abort before decode begins, so no partially populated
/// value is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The path resolves to nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// The path resolves, but not to the expected role.
    #[error("{path}: expected a {expected:?}, found a {actual:?}")]
    WrongKind {
        path: String,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// The named attribute does not exist on the node.
    #[error("attribute {name:?} not found on {path:?}")]
    AttributeNotFound { path: String, name: String },

    /// The requested sub-region is malformed or out of range.
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),

    /// The underlying bulk read failed.
    #[error("read failed: {0}")]
    Read(#[source] StoreError),

    /// The transient read buffer could not be allocated.
    #[error("allocation of {requested} bytes failed")]
    Allocation { requested: usize },

    /// Any other container-side failure.
    #[error("container error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
