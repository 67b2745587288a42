//! Typed data marshaling: raw container bytes to host-safe values.
//!
//! Datasets and attributes expose structurally similar but distinct read
//! calls; the marshaler sees both through the [`DataSource`] capability
//! trait (one adapter per concrete source) instead of branching on a
//! source-kind flag. Per-element decoding follows the type class:
//!
//! - string arrays are bulk-read once and decoded element by element,
//!   resolving variable-length references into library-owned storage;
//! - scalar strings decode straight into a single value;
//! - everything else is returned as an opaque byte buffer tagged with its
//!   element stride — the host's numeric machinery takes over once it has
//!   the descriptor.
//!
//! Variable-length buffers reference library-owned storage that must be
//! reclaimed exactly once, after decode and before the buffer is released.
//! [`VlenGuard`] makes that ordering unskippable: early returns and error
//! paths reclaim on drop, and a completed reclaim disarms the guard.

use byteorder::{ByteOrder as _, LittleEndian};
use h5bridge_store::{Container, Dataspace, Datatype, RawHandle, TypeClass, VLEN_REF_SIZE};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::select::Region;

// ---------------------------------------------------------------------------
// MarshaledValue
// ---------------------------------------------------------------------------

/// A decoded, host-safe value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MarshaledValue {
    /// A single (scalar) string.
    String(String),
    /// An ordered sequence of strings, one per element, index order
    /// preserved.
    StringArray(Vec<String>),
    /// Raw element bytes with their stride; numeric interpretation is the
    /// host's job once it has the descriptor.
    Bytes {
        data: Vec<u8>,
        element_size: u64,
        element_count: u64,
    },
}

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

/// Capability interface over one readable typed object.
pub trait DataSource<C: Container> {
    /// The container the object lives in.
    fn container(&self) -> &C;

    /// The object's dataspace.
    fn space(&self) -> Result<Dataspace>;

    /// The object's datatype.
    fn dtype(&self) -> Result<Datatype>;

    /// Bulk-read the region into `buf` (exactly
    /// `element_size × element_count` bytes). Fails with [`Error::Read`]
    /// before anything is decoded.
    fn read_into(&self, region: &Region, buf: &mut [u8]) -> Result<()>;
}

/// A dataset as a data source; honors the region's source selection.
pub struct DatasetSource<'c, C: Container> {
    container: &'c C,
    handle: RawHandle,
}

impl<'c, C: Container> DatasetSource<'c, C> {
    pub fn new(container: &'c C, handle: RawHandle) -> Self {
        DatasetSource { container, handle }
    }
}

impl<C: Container> DataSource<C> for DatasetSource<'_, C> {
    fn container(&self) -> &C {
        self.container
    }

    fn space(&self) -> Result<Dataspace> {
        Ok(self.container.get_space(self.handle)?)
    }

    fn dtype(&self) -> Result<Datatype> {
        Ok(self.container.get_type(self.handle)?)
    }

    fn read_into(&self, region: &Region, buf: &mut [u8]) -> Result<()> {
        self.container
            .read_dataset(self.handle, &region.source, buf)
            .map_err(Error::Read)
    }
}

/// An attribute as a data source; attributes are always read whole, so the
/// region's source selection is necessarily the full extent.
pub struct AttributeSource<'c, C: Container> {
    container: &'c C,
    handle: RawHandle,
}

impl<'c, C: Container> AttributeSource<'c, C> {
    pub fn new(container: &'c C, handle: RawHandle) -> Self {
        AttributeSource { container, handle }
    }
}

impl<C: Container> DataSource<C> for AttributeSource<'_, C> {
    fn container(&self) -> &C {
        self.container
    }

    fn space(&self) -> Result<Dataspace> {
        Ok(self.container.get_space(self.handle)?)
    }

    fn dtype(&self) -> Result<Datatype> {
        Ok(self.container.get_type(self.handle)?)
    }

    fn read_into(&self, _region: &Region, buf: &mut [u8]) -> Result<()> {
        self.container
            .read_attribute(self.handle, buf)
            .map_err(Error::Read)
    }
}

// ---------------------------------------------------------------------------
// VlenGuard
// ---------------------------------------------------------------------------

/// A populated buffer of variable-length references, reclaimed exactly once.
///
/// The reclaim references the destination shape, not the source's: it
/// operates over the in-memory layout that was just filled.
struct VlenGuard<'c, C: Container> {
    container: &'c C,
    dest_shape: Vec<u64>,
    buf: Vec<u8>,
    released: bool,
}

impl<'c, C: Container> VlenGuard<'c, C> {
    fn new(container: &'c C, dest_shape: &[u64], buf: Vec<u8>) -> Self {
        VlenGuard {
            container,
            dest_shape: dest_shape.to_vec(),
            buf,
            released: false,
        }
    }

    fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Reclaim the library-owned storage now that decoding is done.
    fn reclaim(mut self) -> Result<()> {
        self.released = true;
        self.container
            .vlen_reclaim(&self.dest_shape, &self.buf)
            .map_err(Error::Store)
    }
}

impl<C: Container> Drop for VlenGuard<'_, C> {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.container.vlen_reclaim(&self.dest_shape, &self.buf);
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Allocate a zeroed read buffer, surfacing allocation failure instead of
/// aborting.
fn alloc_buffer(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { requested: len })?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Decode bytes as a string terminated at the first null byte, or at the
/// end of the slice, whichever comes first. The slice bound is the
/// per-element size, so fixed-length decoding can never read past it.
fn decode_terminated(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Read and decode one typed object per its class and the validated region.
pub fn read<C: Container, S: DataSource<C>>(source: &S, region: &Region) -> Result<MarshaledValue> {
    let dtype = source.dtype()?;
    let element_size = dtype.size() as usize;
    let element_count = region.element_count() as usize;
    debug!(
        class = ?dtype.class(),
        element_size,
        element_count,
        "marshaling read"
    );

    match dtype.class() {
        TypeClass::String if region.dest_shape.is_empty() => {
            read_scalar_string(source, region, &dtype)
        }
        TypeClass::String => read_string_array(source, region, &dtype, element_count),
        _ => {
            let mut data = alloc_buffer(element_count * element_size)?;
            source.read_into(region, &mut data)?;
            Ok(MarshaledValue::Bytes {
                data,
                element_size: element_size as u64,
                element_count: element_count as u64,
            })
        }
    }
}

fn read_string_array<C: Container, S: DataSource<C>>(
    source: &S,
    region: &Region,
    dtype: &Datatype,
    element_count: usize,
) -> Result<MarshaledValue> {
    let element_size = dtype.size() as usize;
    let mut buf = alloc_buffer(element_count * element_size)?;
    source.read_into(region, &mut buf)?;

    if dtype.is_variable_string() {
        let container = source.container();
        let guard = VlenGuard::new(container, &region.dest_shape, buf);
        let mut out = Vec::with_capacity(element_count);
        for i in 0..element_count {
            let start = i * element_size;
            let reference =
                LittleEndian::read_u64(&guard.bytes()[start..start + VLEN_REF_SIZE as usize]);
            // A failed resolve drops the guard, which still reclaims the
            // references the bulk read populated.
            let owned = container.vlen_read(reference)?;
            out.push(decode_terminated(&owned));
        }
        guard.reclaim()?;
        Ok(MarshaledValue::StringArray(out))
    } else {
        let mut out = Vec::with_capacity(element_count);
        for i in 0..element_count {
            let start = i * element_size;
            out.push(decode_terminated(&buf[start..start + element_size]));
        }
        Ok(MarshaledValue::StringArray(out))
    }
}

fn read_scalar_string<C: Container, S: DataSource<C>>(
    source: &S,
    region: &Region,
    dtype: &Datatype,
) -> Result<MarshaledValue> {
    let element_size = dtype.size() as usize;
    let mut buf = alloc_buffer(element_size)?;
    source.read_into(region, &mut buf)?;

    if dtype.is_variable_string() {
        let container = source.container();
        let guard = VlenGuard::new(container, &region.dest_shape, buf);
        let reference = LittleEndian::read_u64(&guard.bytes()[..VLEN_REF_SIZE as usize]);
        let owned = container.vlen_read(reference)?;
        let value = decode_terminated(&owned);
        guard.reclaim()?;
        Ok(MarshaledValue::String(value))
    } else {
        Ok(MarshaledValue::String(decode_terminated(&buf)))
    }
}
