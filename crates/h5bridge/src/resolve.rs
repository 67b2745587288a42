//! Object resolution: path + expected role to an open handle.
//!
//! The stored kind is determined first, independently of what the caller
//! expects, and the open call is dispatched on that actual kind; a caller
//! expecting the wrong role gets [`Error::WrongKind`] rather than a failed
//! open. The three kinds are the only legal owners of an attribute.

use h5bridge_store::{Container, ObjectKind, StoreError};
use tracing::trace;

use crate::error::{Error, Result};
use crate::handle::ScopedHandle;

/// What the caller expects the path to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Group,
    Dataset,
    NamedType,
    /// Any of the three kinds; used for attribute access, where the owner
    /// kind does not matter.
    Any,
}

impl Role {
    fn expected_kind(self) -> Option<ObjectKind> {
        match self {
            Role::Group => Some(ObjectKind::Group),
            Role::Dataset => Some(ObjectKind::Dataset),
            Role::NamedType => Some(ObjectKind::NamedType),
            Role::Any => None,
        }
    }
}

fn map_lookup_err(path: &str, err: StoreError) -> Error {
    match err {
        StoreError::PathNotFound(_) => Error::NotFound(path.to_string()),
        StoreError::KindMismatch {
            expected, actual, ..
        } => Error::WrongKind {
            path: path.to_string(),
            expected,
            actual,
        },
        other => Error::Store(other),
    }
}

/// Resolve `path` to an open handle of the expected role.
///
/// The returned guard owns the handle; it is released when the guard drops,
/// on success and failure alike.
pub fn resolve<'c, C: Container>(
    container: &'c C,
    path: &str,
    role: Role,
) -> Result<ScopedHandle<'c, C>> {
    let kind = container
        .child_kind(path)
        .map_err(|e| map_lookup_err(path, e))?;
    if let Some(expected) = role.expected_kind() {
        if kind != expected {
            return Err(Error::WrongKind {
                path: path.to_string(),
                expected,
                actual: kind,
            });
        }
    }
    let raw = match kind {
        ObjectKind::Group => container.open_group(path),
        ObjectKind::Dataset => container.open_dataset(path),
        ObjectKind::NamedType => container.open_named_type(path),
    }
    .map_err(|e| map_lookup_err(path, e))?;
    trace!(path, ?kind, "resolved object");
    Ok(ScopedHandle::new(container, raw))
}

/// Resolve `path` and open the attribute `name` on it.
///
/// Returns both guards: the attribute handle stays valid only while its
/// owner is open.
pub fn resolve_attribute<'c, C: Container>(
    container: &'c C,
    path: &str,
    name: &str,
) -> Result<(ScopedHandle<'c, C>, ScopedHandle<'c, C>)> {
    let owner = resolve(container, path, Role::Any)?;
    let raw = container
        .open_attribute(owner.raw(), name)
        .map_err(|e| match e {
            StoreError::AttributeNotFound { .. } => Error::AttributeNotFound {
                path: path.to_string(),
                name: name.to_string(),
            },
            other => Error::Store(other),
        })?;
    let attr = ScopedHandle::new(container, raw);
    Ok((owner, attr))
}
