//! Node kinds, link kinds, and access-mode flags.
//!
//! The numeric codes here are the source format's on-wire values and must
//! stay bit-for-bit compatible with them: hosts compare against the same
//! constants the native library exports.

use serde::Serialize;

/// Code reported for an object whose kind could not be determined.
pub const UNKNOWN_OBJECT_CODE: i32 = -1;

/// Kind of an addressable node in the container.
///
/// These are the only three legal owners of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObjectKind {
    Group,
    Dataset,
    NamedType,
}

impl ObjectKind {
    /// The format's numeric object-type code (`H5O_TYPE_*`).
    pub fn code(self) -> i32 {
        match self {
            ObjectKind::Group => 0,
            ObjectKind::Dataset => 1,
            ObjectKind::NamedType => 2,
        }
    }
}

/// Kind of a link connecting a group to a child node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkKind {
    Error,
    Hard,
    Soft,
    External,
}

impl LinkKind {
    /// The format's numeric link-type code (`H5L_TYPE_*`).
    pub fn code(self) -> i32 {
        match self {
            LinkKind::Error => -1,
            LinkKind::Hard => 0,
            LinkKind::Soft => 1,
            LinkKind::External => 64,
        }
    }
}

/// Metadata carried by a link, as reported by link enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkInfo {
    /// What kind of link this is.
    pub kind: LinkKind,
    /// Creation order of the link within its parent group, when tracked.
    pub creation_order: Option<u64>,
    /// Character set of the link name.
    pub charset: crate::datatype::CharacterSet,
}

/// Access mode requested when opening a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessMode {
    /// Open existing, read-only.
    ReadOnly,
    /// Open existing, read-write.
    ReadWrite,
    /// Overwrite any existing container.
    Truncate,
    /// Create, failing if the container already exists.
    Exclusive,
    /// Create if absent.
    Create,
    /// Read-write as the single writer; readers may be attached.
    SwmrWrite,
    /// Read-only while an external single writer may be active.
    ///
    /// Under this mode readers must tolerate transient metadata changes:
    /// nothing derived from the container may be cached across calls.
    SwmrRead,
}

impl AccessMode {
    /// The format's access-flag bits (`H5F_ACC_*`).
    pub fn flags(self) -> u32 {
        match self {
            AccessMode::ReadOnly => 0x0000,
            AccessMode::ReadWrite => 0x0001,
            AccessMode::Truncate => 0x0002,
            AccessMode::Exclusive => 0x0004,
            AccessMode::Create => 0x0010,
            AccessMode::SwmrWrite => 0x0020,
            AccessMode::SwmrRead => 0x0040,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_kind_codes() {
        assert_eq!(ObjectKind::Group.code(), 0);
        assert_eq!(ObjectKind::Dataset.code(), 1);
        assert_eq!(ObjectKind::NamedType.code(), 2);
        assert_eq!(UNKNOWN_OBJECT_CODE, -1);
    }

    #[test]
    fn link_kind_codes() {
        assert_eq!(LinkKind::Error.code(), -1);
        assert_eq!(LinkKind::Hard.code(), 0);
        assert_eq!(LinkKind::Soft.code(), 1);
        assert_eq!(LinkKind::External.code(), 64);
    }

    #[test]
    fn access_mode_flags() {
        assert_eq!(AccessMode::ReadOnly.flags(), 0x0000);
        assert_eq!(AccessMode::ReadWrite.flags(), 0x0001);
        assert_eq!(AccessMode::Truncate.flags(), 0x0002);
        assert_eq!(AccessMode::Exclusive.flags(), 0x0004);
        assert_eq!(AccessMode::Create.flags(), 0x0010);
        assert_eq!(AccessMode::SwmrWrite.flags(), 0x0020);
        assert_eq!(AccessMode::SwmrRead.flags(), 0x0040);
    }
}
