//! Type descriptor derivation.
//!
//! Turns a typed object's native dataspace + datatype into the normalized,
//! host-consumable [`TypeDescriptor`]. Derivation is pure and idempotent:
//! it mutates nothing and re-derives from the container on every call, so
//! descriptors stay correct under an external single writer.

use h5bridge_store::{ByteOrder, CharacterSet, Container, Datatype, RawHandle, TypeClass};
use serde::Serialize;

use crate::error::Result;

/// Normalized description of a typed object's shape and element type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    /// Dimension extents, outermost first; empty for scalars.
    pub shape: Vec<u64>,
    /// Total element count: the product of `shape` (1 for scalars).
    pub total_size: u64,
    /// Element classification.
    pub type_class: TypeClass,
    /// Byte size of one element as stored in a read buffer.
    pub element_size: u64,
    /// Signedness; `None` when the class has no such notion.
    pub is_signed: Option<bool>,
    /// True iff the byte order is the format's little-endian tag; any
    /// other order, including undefined, reports false.
    pub little_endian: bool,
    /// Character set; `None` for non-string classes.
    pub charset: Option<CharacterSet>,
    /// True for variable-length strings. Fixed- and variable-length
    /// strings share the string class, so this comes from a dedicated
    /// query, never from the class alone.
    pub is_variable_length: bool,
    /// In-memory size of the full value: `total_size × element_size`.
    pub in_memory_size: u64,
}

/// Derive the descriptor for an open dataset or attribute.
pub fn describe<C: Container>(container: &C, handle: RawHandle) -> Result<TypeDescriptor> {
    let space = container.get_space(handle)?;
    let dtype = container.get_type(handle)?;

    let shape = space.extents.clone();
    let total_size = space.num_elements();
    let element_size = u64::from(dtype.size());

    let little_endian = dtype.byte_order() == Some(ByteOrder::LittleEndian);
    let (is_signed, charset) = match &dtype {
        Datatype::Integer { signed, .. } => (Some(*signed), None),
        // Floats have no unsigned representation in the source format, so
        // they report signed by convention.
        Datatype::Float { .. } => (Some(true), None),
        Datatype::String { charset, .. } => (None, Some(*charset)),
        // Unrecognized classes get shape/size fields only; nothing is
        // guessed for the class-specific ones.
        Datatype::Other { .. } => (None, None),
    };

    Ok(TypeDescriptor {
        shape,
        total_size,
        type_class: dtype.class(),
        element_size,
        is_signed,
        little_endian,
        charset,
        is_variable_length: dtype.is_variable_string(),
        in_memory_size: total_size * element_size,
    })
}
