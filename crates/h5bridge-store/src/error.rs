//! Errors reported by container implementations.

use crate::object::ObjectKind;

/// Errors from container-side operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The path does not resolve to any node.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// The node exists but is not of the kind the operation requires.
    #[error("{path}: expected {expected:?}, found {actual:?}")]
    KindMismatch {
        path: String,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// The named attribute does not exist on the object.
    #[error("attribute not found: {name}")]
    AttributeNotFound { name: String },

    /// The named link does not exist in the group.
    #[error("link not found: {name}")]
    LinkNotFound { name: String },

    /// The handle is unknown or was already closed.
    #[error("stale handle: {0}")]
    StaleHandle(u64),

    /// The handle refers to an object that does not support the operation.
    #[error("handle {handle} is not a {expected}")]
    WrongHandleTarget { handle: u64, expected: &'static str },

    /// A read was issued with a buffer of the wrong length.
    #[error("buffer length mismatch: need {expected} bytes, got {actual}")]
    BufferMismatch { expected: usize, actual: usize },

    /// A source selection does not fit the dataspace it was applied to.
    #[error("selection out of bounds in dimension {dim}: {offset}+{count} > {extent}")]
    SelectionOutOfBounds {
        dim: usize,
        offset: u64,
        count: u64,
        extent: u64,
    },

    /// A variable-length reference does not point at live library-owned
    /// storage (never written, or already reclaimed).
    #[error("stale variable-length reference: {0:#x}")]
    StaleVlenRef(u64),

    /// The bulk read itself failed inside the container.
    #[error("read failed: {0}")]
    ReadFailed(String),
}

/// Result alias for container operations.
pub type StoreResult<T> = Result<T, StoreError>;
