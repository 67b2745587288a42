//! The handle-based container interface the marshaling engine consumes.

use crate::dataspace::Dataspace;
use crate::datatype::Datatype;
use crate::error::StoreResult;
use crate::object::{LinkInfo, ObjectKind};
use crate::selection::SourceSelection;

/// An opaque native handle to an open object or attribute.
///
/// Handles are issued by `open_*` calls and must be released with
/// [`Container::close`] exactly once; every other use of a closed handle
/// fails with a stale-handle error.
pub type RawHandle = u64;

/// A hierarchical, self-describing array container.
///
/// All implementations must satisfy these invariants:
/// - Operations are synchronous and run to completion; there is no
///   suspension point and no cancellation.
/// - One container handle is accessed by one caller at a time; the trait
///   takes `&self` only because handle bookkeeping is interior state.
/// - Introspection (`get_space`, `get_type`) is pure: it re-derives
///   metadata on every call and mutates nothing, so readers tolerate an
///   external single writer (SWMR) by never observing cached state.
/// - `read_dataset`/`read_attribute` either fill the whole buffer or fail
///   without partial effects visible to the caller.
pub trait Container {
    /// Determine the stored kind of the node at `path`.
    fn child_kind(&self, path: &str) -> StoreResult<ObjectKind>;

    /// Open the group at `path`.
    fn open_group(&self, path: &str) -> StoreResult<RawHandle>;

    /// Open the dataset at `path`.
    fn open_dataset(&self, path: &str) -> StoreResult<RawHandle>;

    /// Open the named datatype at `path`.
    fn open_named_type(&self, path: &str) -> StoreResult<RawHandle>;

    /// Open the attribute `name` on an already-open object.
    fn open_attribute(&self, owner: RawHandle, name: &str) -> StoreResult<RawHandle>;

    /// Release a handle. Each handle must be closed exactly once.
    fn close(&self, handle: RawHandle) -> StoreResult<()>;

    /// Names of the links in the group at `path`, in increasing
    /// name-lexicographic order.
    fn link_names(&self, path: &str) -> StoreResult<Vec<String>>;

    /// Metadata of the link `name` in the group at `path`.
    fn link_info(&self, path: &str, name: &str) -> StoreResult<LinkInfo>;

    /// Names of the attributes on an open object, in increasing
    /// name-lexicographic order.
    fn attribute_names(&self, owner: RawHandle) -> StoreResult<Vec<String>>;

    /// The dataspace of an open dataset or attribute.
    fn get_space(&self, handle: RawHandle) -> StoreResult<Dataspace>;

    /// The datatype of an open dataset or attribute.
    fn get_type(&self, handle: RawHandle) -> StoreResult<Datatype>;

    /// Bulk-read the selected region of a dataset into `buf`.
    ///
    /// `buf` must be exactly `element_size × selected_element_count` bytes.
    /// Selected elements land densely in `buf` in row-major index order.
    fn read_dataset(
        &self,
        dataset: RawHandle,
        selection: &SourceSelection,
        buf: &mut [u8],
    ) -> StoreResult<()>;

    /// Bulk-read the full value of an attribute into `buf`.
    ///
    /// `buf` must be exactly `element_size × element_count` bytes.
    fn read_attribute(&self, attribute: RawHandle, buf: &mut [u8]) -> StoreResult<()>;

    /// Resolve one variable-length reference to the library-owned bytes it
    /// points at. The reference stays live until reclaimed.
    fn vlen_read(&self, reference: u64) -> StoreResult<Vec<u8>>;

    /// Release the library-owned storage referenced by every element of a
    /// populated variable-length buffer.
    ///
    /// `mem_shape` is the in-memory (destination) shape of the buffer that
    /// was just filled; `buf` holds `∏ mem_shape` references (one element
    /// for rank 0). Must be called exactly once per populated buffer, and
    /// only after decoding: reclaiming twice fails with a stale-reference
    /// error.
    fn vlen_reclaim(&self, mem_shape: &[u64], buf: &[u8]) -> StoreResult<()>;

    /// Number of currently open object and attribute handles.
    ///
    /// Diagnostic used to assert that no handle leaks across a call.
    fn open_object_count(&self) -> usize;
}
