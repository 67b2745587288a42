//! Datatype: the element-type descriptor of a dataset or attribute.
//!
//! Only the classes the engine models are represented structurally
//! (integer, float, string); everything else is carried as [`Datatype::Other`]
//! with its raw class code and byte size so it can degrade to opaque bytes.

use serde::Serialize;

/// Byte size of a variable-length element reference in a fixed buffer.
///
/// Variable-length strings store a pointer-sized reference that indirects
/// to separately sized, library-owned storage.
pub const VLEN_REF_SIZE: u32 = 8;

/// Byte order of stored elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
    Vax,
    /// No meaningful order (single-byte or non-numeric data).
    None,
}

impl ByteOrder {
    /// The format's numeric order code (`H5T_ORDER_*`).
    pub fn code(self) -> i32 {
        match self {
            ByteOrder::LittleEndian => 0,
            ByteOrder::BigEndian => 1,
            ByteOrder::Vax => 2,
            ByteOrder::None => 4,
        }
    }
}

/// Character set encoding of string data and link names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CharacterSet {
    Ascii,
    Utf8,
}

impl CharacterSet {
    /// The format's numeric charset code (`H5T_CSET_*`).
    pub fn code(self) -> i32 {
        match self {
            CharacterSet::Ascii => 0,
            CharacterSet::Utf8 => 1,
        }
    }
}

/// Classification of a datatype, as reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeClass {
    Integer,
    Float,
    String,
    /// A class the engine does not model; carries the raw class code.
    Other(i32),
}

impl TypeClass {
    /// The format's numeric class code (`H5T_class_t`).
    pub fn code(self) -> i32 {
        match self {
            TypeClass::Integer => 0,
            TypeClass::Float => 1,
            TypeClass::String => 3,
            TypeClass::Other(code) => code,
        }
    }
}

/// Element-type descriptor of a dataset or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Datatype {
    /// Fixed-width integer elements.
    Integer {
        size: u32,
        byte_order: ByteOrder,
        signed: bool,
    },
    /// Fixed-width floating-point elements.
    Float { size: u32, byte_order: ByteOrder },
    /// Character data: fixed-length buffers, or variable-length references.
    ///
    /// When `variable` is set, `size` is [`VLEN_REF_SIZE`] and each stored
    /// element is a reference into library-owned storage.
    String {
        size: u32,
        byte_order: ByteOrder,
        charset: CharacterSet,
        variable: bool,
    },
    /// A class the engine does not model (compound, enum, array, ...).
    Other { class_code: i32, size: u32 },
}

impl Datatype {
    /// Byte size of one element as stored in a read buffer.
    pub fn size(&self) -> u32 {
        match *self {
            Datatype::Integer { size, .. }
            | Datatype::Float { size, .. }
            | Datatype::String { size, .. }
            | Datatype::Other { size, .. } => size,
        }
    }

    /// Classification of this datatype.
    pub fn class(&self) -> TypeClass {
        match *self {
            Datatype::Integer { .. } => TypeClass::Integer,
            Datatype::Float { .. } => TypeClass::Float,
            Datatype::String { .. } => TypeClass::String,
            Datatype::Other { class_code, .. } => TypeClass::Other(class_code),
        }
    }

    /// Byte order, when the class carries one.
    pub fn byte_order(&self) -> Option<ByteOrder> {
        match *self {
            Datatype::Integer { byte_order, .. }
            | Datatype::Float { byte_order, .. }
            | Datatype::String { byte_order, .. } => Some(byte_order),
            Datatype::Other { .. } => None,
        }
    }

    /// Whether this is a variable-length string type.
    ///
    /// A dedicated query: fixed- and variable-length strings share the
    /// string class, so the class alone cannot answer this.
    pub fn is_variable_string(&self) -> bool {
        matches!(*self, Datatype::String { variable: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_codes() {
        assert_eq!(TypeClass::Integer.code(), 0);
        assert_eq!(TypeClass::Float.code(), 1);
        assert_eq!(TypeClass::String.code(), 3);
        assert_eq!(TypeClass::Other(6).code(), 6);
    }

    #[test]
    fn order_and_charset_codes() {
        assert_eq!(ByteOrder::LittleEndian.code(), 0);
        assert_eq!(ByteOrder::BigEndian.code(), 1);
        assert_eq!(ByteOrder::Vax.code(), 2);
        assert_eq!(ByteOrder::None.code(), 4);
        assert_eq!(CharacterSet::Ascii.code(), 0);
        assert_eq!(CharacterSet::Utf8.code(), 1);
    }

    #[test]
    fn variable_string_query() {
        let fixed = Datatype::String {
            size: 8,
            byte_order: ByteOrder::None,
            charset: CharacterSet::Ascii,
            variable: false,
        };
        let vlen = Datatype::String {
            size: VLEN_REF_SIZE,
            byte_order: ByteOrder::None,
            charset: CharacterSet::Utf8,
            variable: true,
        };
        assert!(!fixed.is_variable_string());
        assert!(vlen.is_variable_string());
        assert_eq!(fixed.class(), vlen.class());
    }

    #[test]
    fn other_class_has_no_order() {
        let dt = Datatype::Other {
            class_code: 6,
            size: 16,
        };
        assert_eq!(dt.byte_order(), None);
        assert_eq!(dt.size(), 16);
    }
}
