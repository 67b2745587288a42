//! In-memory reference container.
//!
//! `MemContainer` implements [`Container`] over an immutable node tree built
//! by [`ContainerBuilder`](crate::builder::ContainerBuilder). Mutable state
//! is limited to the handle table and the variable-length heap, both behind
//! `RefCell`: the access model is single-threaded and synchronous, and the
//! container is deliberately not `Sync`.
//!
//! Variable-length string elements are stored as 8-byte little-endian
//! references into a heap of library-owned byte strings, the in-memory
//! analogue of a global-heap collection. Reclaiming a reference twice is
//! detectable here (`StaleVlenRef`) where the real library leaves it
//! undefined.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use byteorder::{ByteOrder as _, LittleEndian};
use tracing::trace;

use crate::container::{Container, RawHandle};
use crate::dataspace::Dataspace;
use crate::datatype::{Datatype, VLEN_REF_SIZE};
use crate::error::{StoreError, StoreResult};
use crate::object::{AccessMode, LinkInfo, ObjectKind};
use crate::selection::{Hyperslab, SourceSelection};

// ---------------------------------------------------------------------------
// Stored records
// ---------------------------------------------------------------------------

/// A (dataspace, datatype, data) triple: the stored form of a dataset or an
/// attribute value.
#[derive(Debug, Clone)]
pub(crate) struct ArrayValue {
    pub space: Dataspace,
    pub dtype: Datatype,
    /// Dense row-major element bytes; for variable-length strings, 8-byte
    /// references into the vlen heap.
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub(crate) struct NodeRecord {
    pub kind: ObjectKind,
    /// Present when `kind` is `Dataset`.
    pub dataset: Option<ArrayValue>,
    /// Present when `kind` is `NamedType`.
    pub named_type: Option<Datatype>,
    /// Attributes keyed by name; `BTreeMap` gives the name-lexicographic
    /// enumeration order the interface promises.
    pub attrs: BTreeMap<String, ArrayValue>,
}

#[derive(Debug)]
enum HandleTarget {
    Object(String),
    Attribute { path: String, name: String },
}

/// Normalize a `/`-delimited path: no leading or trailing slash, empty
/// string for the root.
pub(crate) fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

// ---------------------------------------------------------------------------
// MemContainer
// ---------------------------------------------------------------------------

/// An in-memory container over an immutable node tree.
pub struct MemContainer {
    mode: AccessMode,
    pub(crate) nodes: BTreeMap<String, NodeRecord>,
    /// Link records per parent path, keyed by child name.
    pub(crate) links: BTreeMap<String, BTreeMap<String, LinkInfo>>,
    /// Soft-link aliases: alias path -> target path (one indirection).
    pub(crate) aliases: HashMap<String, String>,
    handles: RefCell<HashMap<RawHandle, HandleTarget>>,
    next_handle: Cell<RawHandle>,
    pub(crate) heap: RefCell<HashMap<u64, Vec<u8>>>,
    pub(crate) next_vlen_ref: Cell<u64>,
    reclaim_calls: Cell<u64>,
}

impl MemContainer {
    pub(crate) fn empty(mode: AccessMode) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            String::new(),
            NodeRecord {
                kind: ObjectKind::Group,
                dataset: None,
                named_type: None,
                attrs: BTreeMap::new(),
            },
        );
        MemContainer {
            mode,
            nodes,
            links: BTreeMap::new(),
            aliases: HashMap::new(),
            handles: RefCell::new(HashMap::new()),
            // Handle values start away from zero so a stale zero handle is
            // never accidentally valid.
            next_handle: Cell::new(0x100),
            heap: RefCell::new(HashMap::new()),
            next_vlen_ref: Cell::new(0x1000),
            reclaim_calls: Cell::new(0),
        }
    }

    /// The access mode this container was opened with.
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Number of live (unreclaimed) variable-length heap entries.
    pub fn vlen_live_count(&self) -> usize {
        self.heap.borrow().len()
    }

    /// Number of reclaim calls issued so far.
    pub fn vlen_reclaim_calls(&self) -> u64 {
        self.reclaim_calls.get()
    }

    /// Store one library-owned byte string, returning its reference.
    pub(crate) fn alloc_vlen(&mut self, bytes: Vec<u8>) -> u64 {
        let reference = self.next_vlen_ref.get();
        self.next_vlen_ref.set(reference + 1);
        self.heap.borrow_mut().insert(reference, bytes);
        reference
    }

    fn resolve_path<'a>(&'a self, path: &str) -> StoreResult<(String, &'a NodeRecord)> {
        let mut key = normalize(path);
        if !self.nodes.contains_key(&key) {
            if let Some(target) = self.aliases.get(&key) {
                key = target.clone();
            }
        }
        match self.nodes.get(&key) {
            Some(node) => Ok((key, node)),
            None => Err(StoreError::PathNotFound(path.to_string())),
        }
    }

    fn open_as(&self, path: &str, expected: ObjectKind) -> StoreResult<RawHandle> {
        let (key, node) = self.resolve_path(path)?;
        if node.kind != expected {
            return Err(StoreError::KindMismatch {
                path: path.to_string(),
                expected,
                actual: node.kind,
            });
        }
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        self.handles
            .borrow_mut()
            .insert(handle, HandleTarget::Object(key));
        trace!(handle, path, "opened object");
        Ok(handle)
    }

    /// Look up the array value (dataset or attribute) behind a handle.
    fn array_value(&self, handle: RawHandle) -> StoreResult<ArrayValue> {
        let handles = self.handles.borrow();
        let target = handles
            .get(&handle)
            .ok_or(StoreError::StaleHandle(handle))?;
        match target {
            HandleTarget::Object(path) => {
                let node = self
                    .nodes
                    .get(path)
                    .ok_or_else(|| StoreError::PathNotFound(path.clone()))?;
                node.dataset
                    .clone()
                    .ok_or(StoreError::WrongHandleTarget {
                        handle,
                        expected: "dataset or attribute",
                    })
            }
            HandleTarget::Attribute { path, name } => {
                let node = self
                    .nodes
                    .get(path)
                    .ok_or_else(|| StoreError::PathNotFound(path.clone()))?;
                node.attrs
                    .get(name)
                    .cloned()
                    .ok_or_else(|| StoreError::AttributeNotFound { name: name.clone() })
            }
        }
    }

    fn check_buf(expected: usize, buf: &[u8]) -> StoreResult<()> {
        if buf.len() != expected {
            return Err(StoreError::BufferMismatch {
                expected,
                actual: buf.len(),
            });
        }
        Ok(())
    }

    /// Copy a hyperslab out of dense row-major `data` into `buf`.
    fn copy_hyperslab(
        value: &ArrayValue,
        slab: &Hyperslab,
        buf: &mut [u8],
    ) -> StoreResult<()> {
        let extents = &value.space.extents;
        if slab.offset.len() != extents.len() || slab.count.len() != extents.len() {
            return Err(StoreError::ReadFailed(format!(
                "selection rank {} does not match dataspace rank {}",
                slab.offset.len(),
                extents.len()
            )));
        }
        for (dim, extent) in extents.iter().enumerate() {
            let end = slab.offset[dim].checked_add(slab.count[dim]);
            if end.map_or(true, |end| end > *extent) {
                return Err(StoreError::SelectionOutOfBounds {
                    dim,
                    offset: slab.offset[dim],
                    count: slab.count[dim],
                    extent: *extent,
                });
            }
        }

        let elem = value.dtype.size() as usize;
        Self::check_buf(slab.num_elements() as usize * elem, buf)?;
        if slab.num_elements() == 0 {
            return Ok(());
        }

        let rank = extents.len();
        if rank == 0 {
            buf.copy_from_slice(&value.data);
            return Ok(());
        }

        // Element strides of the source array, row-major.
        let mut strides = vec![1u64; rank];
        for d in (0..rank - 1).rev() {
            strides[d] = strides[d + 1] * extents[d + 1];
        }

        // Odometer over all dimensions but the innermost; the innermost run
        // of `count[rank-1]` elements is contiguous in the source.
        let run = slab.count[rank - 1] as usize * elem;
        let mut index = vec![0u64; rank - 1];
        let mut out = 0usize;
        loop {
            let mut src_elem = slab.offset[rank - 1];
            for d in 0..rank - 1 {
                src_elem += (slab.offset[d] + index[d]) * strides[d];
            }
            let src = src_elem as usize * elem;
            buf[out..out + run].copy_from_slice(&value.data[src..src + run]);
            out += run;

            // Advance the odometer.
            let mut d = rank - 1;
            loop {
                if d == 0 {
                    return Ok(());
                }
                d -= 1;
                index[d] += 1;
                if index[d] < slab.count[d] {
                    break;
                }
                index[d] = 0;
            }
        }
    }
}

impl std::fmt::Debug for MemContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemContainer")
            .field("mode", &self.mode)
            .field("nodes", &self.nodes.len())
            .field("open_handles", &self.handles.borrow().len())
            .field("vlen_live", &self.heap.borrow().len())
            .finish()
    }
}

impl Container for MemContainer {
    fn child_kind(&self, path: &str) -> StoreResult<ObjectKind> {
        let (_, node) = self.resolve_path(path)?;
        Ok(node.kind)
    }

    fn open_group(&self, path: &str) -> StoreResult<RawHandle> {
        self.open_as(path, ObjectKind::Group)
    }

    fn open_dataset(&self, path: &str) -> StoreResult<RawHandle> {
        self.open_as(path, ObjectKind::Dataset)
    }

    fn open_named_type(&self, path: &str) -> StoreResult<RawHandle> {
        self.open_as(path, ObjectKind::NamedType)
    }

    fn open_attribute(&self, owner: RawHandle, name: &str) -> StoreResult<RawHandle> {
        let path = {
            let handles = self.handles.borrow();
            match handles.get(&owner) {
                Some(HandleTarget::Object(path)) => path.clone(),
                Some(HandleTarget::Attribute { .. }) => {
                    return Err(StoreError::WrongHandleTarget {
                        handle: owner,
                        expected: "object",
                    })
                }
                None => return Err(StoreError::StaleHandle(owner)),
            }
        };
        let node = self
            .nodes
            .get(&path)
            .ok_or_else(|| StoreError::PathNotFound(path.clone()))?;
        if !node.attrs.contains_key(name) {
            return Err(StoreError::AttributeNotFound {
                name: name.to_string(),
            });
        }
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        self.handles.borrow_mut().insert(
            handle,
            HandleTarget::Attribute {
                path,
                name: name.to_string(),
            },
        );
        Ok(handle)
    }

    fn close(&self, handle: RawHandle) -> StoreResult<()> {
        match self.handles.borrow_mut().remove(&handle) {
            Some(_) => Ok(()),
            None => Err(StoreError::StaleHandle(handle)),
        }
    }

    fn link_names(&self, path: &str) -> StoreResult<Vec<String>> {
        let (key, node) = self.resolve_path(path)?;
        if node.kind != ObjectKind::Group {
            return Err(StoreError::KindMismatch {
                path: path.to_string(),
                expected: ObjectKind::Group,
                actual: node.kind,
            });
        }
        Ok(self
            .links
            .get(&key)
            .map(|links| links.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn link_info(&self, path: &str, name: &str) -> StoreResult<LinkInfo> {
        let (key, _) = self.resolve_path(path)?;
        self.links
            .get(&key)
            .and_then(|links| links.get(name))
            .cloned()
            .ok_or_else(|| StoreError::LinkNotFound {
                name: name.to_string(),
            })
    }

    fn attribute_names(&self, owner: RawHandle) -> StoreResult<Vec<String>> {
        let handles = self.handles.borrow();
        let path = match handles.get(&owner) {
            Some(HandleTarget::Object(path)) => path.clone(),
            Some(HandleTarget::Attribute { .. }) => {
                return Err(StoreError::WrongHandleTarget {
                    handle: owner,
                    expected: "object",
                })
            }
            None => return Err(StoreError::StaleHandle(owner)),
        };
        drop(handles);
        let node = self
            .nodes
            .get(&path)
            .ok_or_else(|| StoreError::PathNotFound(path.clone()))?;
        Ok(node.attrs.keys().cloned().collect())
    }

    fn get_space(&self, handle: RawHandle) -> StoreResult<Dataspace> {
        Ok(self.array_value(handle)?.space)
    }

    fn get_type(&self, handle: RawHandle) -> StoreResult<Datatype> {
        // Named datatype nodes report their committed type; everything else
        // goes through the dataset/attribute lookup.
        {
            let handles = self.handles.borrow();
            if let Some(HandleTarget::Object(path)) = handles.get(&handle) {
                if let Some(node) = self.nodes.get(path) {
                    if let Some(dtype) = &node.named_type {
                        return Ok(dtype.clone());
                    }
                }
            }
        }
        Ok(self.array_value(handle)?.dtype)
    }

    fn read_dataset(
        &self,
        dataset: RawHandle,
        selection: &SourceSelection,
        buf: &mut [u8],
    ) -> StoreResult<()> {
        let value = self.array_value(dataset)?;
        match selection {
            SourceSelection::All => {
                Self::check_buf(value.data.len(), buf)?;
                buf.copy_from_slice(&value.data);
                Ok(())
            }
            SourceSelection::Hyperslab(slab) => Self::copy_hyperslab(&value, slab, buf),
        }
    }

    fn read_attribute(&self, attribute: RawHandle, buf: &mut [u8]) -> StoreResult<()> {
        let value = self.array_value(attribute)?;
        Self::check_buf(value.data.len(), buf)?;
        buf.copy_from_slice(&value.data);
        Ok(())
    }

    fn vlen_read(&self, reference: u64) -> StoreResult<Vec<u8>> {
        self.heap
            .borrow()
            .get(&reference)
            .cloned()
            .ok_or(StoreError::StaleVlenRef(reference))
    }

    fn vlen_reclaim(&self, mem_shape: &[u64], buf: &[u8]) -> StoreResult<()> {
        self.reclaim_calls.set(self.reclaim_calls.get() + 1);
        let count = mem_shape.iter().product::<u64>() as usize;
        Self::check_buf(count * VLEN_REF_SIZE as usize, buf)?;
        let mut heap = self.heap.borrow_mut();
        for i in 0..count {
            let start = i * VLEN_REF_SIZE as usize;
            let reference = LittleEndian::read_u64(&buf[start..start + 8]);
            if heap.remove(&reference).is_none() {
                return Err(StoreError::StaleVlenRef(reference));
            }
        }
        trace!(count, "reclaimed variable-length storage");
        Ok(())
    }

    fn open_object_count(&self) -> usize {
        self.handles.borrow().len()
    }
}
