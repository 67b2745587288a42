//! Fixture builder for [`MemContainer`].
//!
//! Builds the immutable node tree up front; the result is then read through
//! the [`Container`](crate::container::Container) trait. Datasets and
//! attributes are both described by an [`ArraySpec`], since an attribute is
//! structurally a miniature dataset.
//!
//! ```
//! use h5bridge_store::{ArraySpec, ContainerBuilder};
//!
//! let mut b = ContainerBuilder::new();
//! b.add_group("sensors");
//! b.add_dataset("sensors/temps", ArraySpec::f64(&[22.5, 23.1, 21.8]));
//! b.set_attr("sensors", "location", ArraySpec::fixed_str(16, &["lab"]));
//! let container = b.finish();
//! ```

use std::collections::BTreeMap;

use crate::dataspace::Dataspace;
use crate::datatype::{ByteOrder, CharacterSet, Datatype, VLEN_REF_SIZE};
use crate::memory::{normalize, ArrayValue, MemContainer, NodeRecord};
use crate::object::{AccessMode, LinkInfo, LinkKind, ObjectKind};

// ---------------------------------------------------------------------------
// ArraySpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Payload {
    Raw(Vec<u8>),
    /// Materialized into vlen heap references at `finish` time.
    VlenStrings(Vec<String>),
}

/// Declarative (shape, type, data) description of a dataset or attribute.
#[derive(Debug, Clone)]
pub struct ArraySpec {
    extents: Option<Vec<u64>>,
    dtype: Datatype,
    payload: Payload,
}

impl ArraySpec {
    fn numeric(dtype: Datatype, data: Vec<u8>, len: usize) -> Self {
        ArraySpec {
            extents: Some(vec![len as u64]),
            dtype,
            payload: Payload::Raw(data),
        }
    }

    /// Little-endian signed 32-bit integers.
    pub fn i32(values: &[i32]) -> Self {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::numeric(
            Datatype::Integer {
                size: 4,
                byte_order: ByteOrder::LittleEndian,
                signed: true,
            },
            data,
            values.len(),
        )
    }

    /// Big-endian signed 32-bit integers.
    pub fn i32_be(values: &[i32]) -> Self {
        let data = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        Self::numeric(
            Datatype::Integer {
                size: 4,
                byte_order: ByteOrder::BigEndian,
                signed: true,
            },
            data,
            values.len(),
        )
    }

    /// Little-endian signed 64-bit integers.
    pub fn i64(values: &[i64]) -> Self {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::numeric(
            Datatype::Integer {
                size: 8,
                byte_order: ByteOrder::LittleEndian,
                signed: true,
            },
            data,
            values.len(),
        )
    }

    /// Unsigned bytes.
    pub fn u8(values: &[u8]) -> Self {
        Self::numeric(
            Datatype::Integer {
                size: 1,
                byte_order: ByteOrder::LittleEndian,
                signed: false,
            },
            values.to_vec(),
            values.len(),
        )
    }

    /// Little-endian 32-bit floats.
    pub fn f32(values: &[f32]) -> Self {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::numeric(
            Datatype::Float {
                size: 4,
                byte_order: ByteOrder::LittleEndian,
            },
            data,
            values.len(),
        )
    }

    /// Little-endian 64-bit floats.
    pub fn f64(values: &[f64]) -> Self {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::numeric(
            Datatype::Float {
                size: 8,
                byte_order: ByteOrder::LittleEndian,
            },
            data,
            values.len(),
        )
    }

    /// Fixed-length character buffers of `size` bytes each.
    ///
    /// Values are null-padded; values longer than `size` are truncated.
    pub fn fixed_str(size: u32, values: &[&str]) -> Self {
        let mut data = Vec::with_capacity(values.len() * size as usize);
        for v in values {
            let bytes = v.as_bytes();
            let take = bytes.len().min(size as usize);
            data.extend_from_slice(&bytes[..take]);
            data.resize(data.len() + size as usize - take, 0);
        }
        ArraySpec {
            extents: Some(vec![values.len() as u64]),
            dtype: Datatype::String {
                size,
                byte_order: ByteOrder::None,
                charset: CharacterSet::Ascii,
                variable: false,
            },
            payload: Payload::Raw(data),
        }
    }

    /// Variable-length strings backed by library-owned storage.
    pub fn vlen_str(values: &[&str]) -> Self {
        ArraySpec {
            extents: Some(vec![values.len() as u64]),
            dtype: Datatype::String {
                size: VLEN_REF_SIZE,
                byte_order: ByteOrder::None,
                charset: CharacterSet::Utf8,
                variable: true,
            },
            payload: Payload::VlenStrings(values.iter().map(|v| v.to_string()).collect()),
        }
    }

    /// Raw element bytes under an arbitrary datatype, for classes the
    /// engine does not model.
    pub fn raw(dtype: Datatype, data: Vec<u8>) -> Self {
        let elements = if dtype.size() == 0 {
            0
        } else {
            data.len() / dtype.size() as usize
        };
        ArraySpec {
            extents: Some(vec![elements as u64]),
            dtype,
            payload: Payload::Raw(data),
        }
    }

    /// Make this a scalar (rank 0). The payload must hold one element.
    pub fn scalar(mut self) -> Self {
        self.extents = Some(Vec::new());
        self
    }

    /// Override the shape. The element count must match the payload.
    pub fn with_extents(mut self, extents: &[u64]) -> Self {
        self.extents = Some(extents.to_vec());
        self
    }

    fn materialize(self, container: &mut MemContainer) -> ArrayValue {
        let extents = self.extents.unwrap_or_default();
        let data = match self.payload {
            Payload::Raw(data) => data,
            Payload::VlenStrings(values) => {
                let mut data = Vec::with_capacity(values.len() * VLEN_REF_SIZE as usize);
                for v in values {
                    let mut bytes = v.into_bytes();
                    bytes.push(0);
                    let reference = container.alloc_vlen(bytes);
                    data.extend_from_slice(&reference.to_le_bytes());
                }
                data
            }
        };
        ArrayValue {
            space: Dataspace { extents },
            dtype: self.dtype,
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// ContainerBuilder
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Op {
    Group(String),
    Dataset(String, ArraySpec),
    NamedType(String, Datatype),
    Attr(String, String, ArraySpec),
    SoftLink(String, String),
}

/// Builds a [`MemContainer`] node by node.
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    mode: Option<AccessMode>,
    ops: Vec<Op>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the access mode the container is opened with
    /// (default [`AccessMode::ReadOnly`]).
    pub fn with_mode(mut self, mode: AccessMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Create a group, along with any missing ancestor groups.
    pub fn add_group(&mut self, path: &str) -> &mut Self {
        self.ops.push(Op::Group(path.to_string()));
        self
    }

    /// Create a dataset from an [`ArraySpec`].
    pub fn add_dataset(&mut self, path: &str, spec: ArraySpec) -> &mut Self {
        self.ops.push(Op::Dataset(path.to_string(), spec));
        self
    }

    /// Create a named (committed) datatype node.
    pub fn add_named_type(&mut self, path: &str, dtype: Datatype) -> &mut Self {
        self.ops.push(Op::NamedType(path.to_string(), dtype));
        self
    }

    /// Attach an attribute to the node at `path`.
    pub fn set_attr(&mut self, path: &str, name: &str, spec: ArraySpec) -> &mut Self {
        self.ops
            .push(Op::Attr(path.to_string(), name.to_string(), spec));
        self
    }

    /// Create a soft link at `path` pointing at `target`.
    pub fn soft_link(&mut self, path: &str, target: &str) -> &mut Self {
        self.ops
            .push(Op::SoftLink(path.to_string(), target.to_string()));
        self
    }

    /// Materialize the container.
    pub fn finish(self) -> MemContainer {
        let mut container = MemContainer::empty(self.mode.unwrap_or(AccessMode::ReadOnly));
        for op in self.ops {
            match op {
                Op::Group(path) => {
                    ensure_group(&mut container, &normalize(&path));
                }
                Op::Dataset(path, spec) => {
                    let value = spec.materialize(&mut container);
                    insert_node(
                        &mut container,
                        &normalize(&path),
                        NodeRecord {
                            kind: ObjectKind::Dataset,
                            dataset: Some(value),
                            named_type: None,
                            attrs: BTreeMap::new(),
                        },
                    );
                }
                Op::NamedType(path, dtype) => {
                    insert_node(
                        &mut container,
                        &normalize(&path),
                        NodeRecord {
                            kind: ObjectKind::NamedType,
                            dataset: None,
                            named_type: Some(dtype),
                            attrs: BTreeMap::new(),
                        },
                    );
                }
                Op::Attr(path, name, spec) => {
                    let value = spec.materialize(&mut container);
                    let key = normalize(&path);
                    if let Some(node) = container.nodes.get_mut(&key) {
                        node.attrs.insert(name, value);
                    }
                }
                Op::SoftLink(path, target) => {
                    let key = normalize(&path);
                    let target = normalize(&target);
                    let (parent, name) = split_parent(&key);
                    ensure_group(&mut container, parent);
                    add_link(&mut container, parent, name, LinkKind::Soft);
                    container.aliases.insert(key.clone(), target);
                }
            }
        }
        container
    }
}

/// Split a normalized path into (parent, leaf name).
fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => ("", path),
    }
}

fn add_link(container: &mut MemContainer, parent: &str, name: &str, kind: LinkKind) {
    let links = container.links.entry(parent.to_string()).or_default();
    if links.contains_key(name) {
        return;
    }
    let creation_order = links.len() as u64;
    links.insert(
        name.to_string(),
        LinkInfo {
            kind,
            creation_order: Some(creation_order),
            charset: CharacterSet::Ascii,
        },
    );
}

/// Create the group at `path` (and its ancestors) if missing.
fn ensure_group(container: &mut MemContainer, path: &str) {
    if path.is_empty() || container.nodes.contains_key(path) {
        return;
    }
    let (parent, name) = split_parent(path);
    ensure_group(container, parent);
    container.nodes.insert(
        path.to_string(),
        NodeRecord {
            kind: ObjectKind::Group,
            dataset: None,
            named_type: None,
            attrs: BTreeMap::new(),
        },
    );
    add_link(container, parent, name, LinkKind::Hard);
}

/// Insert a leaf node, creating ancestor groups and the hard link to it.
fn insert_node(container: &mut MemContainer, path: &str, node: NodeRecord) {
    let (parent, name) = split_parent(path);
    ensure_group(container, parent);
    container.nodes.insert(path.to_string(), node);
    add_link(container, parent, name, LinkKind::Hard);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;

    #[test]
    fn nested_paths_create_ancestors() {
        let mut b = ContainerBuilder::new();
        b.add_dataset("a/b/c", ArraySpec::i32(&[1]));
        let c = b.finish();
        assert_eq!(c.child_kind("a").unwrap(), ObjectKind::Group);
        assert_eq!(c.child_kind("a/b").unwrap(), ObjectKind::Group);
        assert_eq!(c.child_kind("a/b/c").unwrap(), ObjectKind::Dataset);
        assert_eq!(c.link_names("a/b").unwrap(), vec!["c"]);
    }

    #[test]
    fn creation_order_tracks_insertion() {
        let mut b = ContainerBuilder::new();
        b.add_dataset("zebra", ArraySpec::i32(&[1]));
        b.add_dataset("apple", ArraySpec::i32(&[2]));
        let c = b.finish();
        assert_eq!(c.link_info("/", "zebra").unwrap().creation_order, Some(0));
        assert_eq!(c.link_info("/", "apple").unwrap().creation_order, Some(1));
        assert_eq!(c.link_info("/", "zebra").unwrap().kind, LinkKind::Hard);
    }

    #[test]
    fn soft_link_resolves_to_target() {
        let mut b = ContainerBuilder::new();
        b.add_dataset("data", ArraySpec::i32(&[7]));
        b.soft_link("alias", "data");
        let c = b.finish();
        assert_eq!(c.child_kind("alias").unwrap(), ObjectKind::Dataset);
        assert_eq!(c.link_info("/", "alias").unwrap().kind, LinkKind::Soft);
    }

    #[test]
    fn fixed_str_pads_and_truncates() {
        let spec = ArraySpec::fixed_str(4, &["ab", "longer"]);
        let mut b = ContainerBuilder::new();
        b.add_dataset("s", spec);
        let c = b.finish();
        let h = c.open_dataset("s").unwrap();
        let mut buf = vec![0u8; 8];
        c.read_dataset(h, &crate::selection::SourceSelection::All, &mut buf)
            .unwrap();
        assert_eq!(&buf, b"ab\0\0long");
        c.close(h).unwrap();
    }

    #[test]
    fn scalar_spec_has_rank_zero() {
        let mut b = ContainerBuilder::new();
        b.add_dataset("x", ArraySpec::i64(&[42]).scalar());
        let c = b.finish();
        let h = c.open_dataset("x").unwrap();
        let space = c.get_space(h).unwrap();
        assert_eq!(space.rank(), 0);
        assert_eq!(space.num_elements(), 1);
        c.close(h).unwrap();
    }

    #[test]
    fn named_type_node() {
        let mut b = ContainerBuilder::new();
        b.add_named_type(
            "types/pixel",
            Datatype::Integer {
                size: 2,
                byte_order: ByteOrder::LittleEndian,
                signed: false,
            },
        );
        let c = b.finish();
        assert_eq!(c.child_kind("types/pixel").unwrap(), ObjectKind::NamedType);
        let h = c.open_named_type("types/pixel").unwrap();
        let dtype = c.get_type(h).unwrap();
        assert_eq!(dtype.size(), 2);
        c.close(h).unwrap();
    }

    #[test]
    fn mode_is_recorded() {
        let b = ContainerBuilder::new().with_mode(AccessMode::SwmrRead);
        let c = b.finish();
        assert_eq!(c.mode(), AccessMode::SwmrRead);
        assert_eq!(c.mode().flags(), 0x0040);
    }
}
