//! Source-side selections for partial reads.
//!
//! The engine only ever issues a single rectangular hyperslab (or the full
//! extent) per read; there is no strided, multi-block, or point selection.

use serde::Serialize;

/// A rectangular per-dimension (offset, count) sub-region of a dataspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hyperslab {
    /// First selected element index per dimension.
    pub offset: Vec<u64>,
    /// Number of selected elements per dimension.
    pub count: Vec<u64>,
}

impl Hyperslab {
    /// Number of selected elements: the product of the per-dimension counts.
    pub fn num_elements(&self) -> u64 {
        self.count.iter().product()
    }
}

/// What part of the source dataspace a read covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SourceSelection {
    /// The full extent.
    All,
    /// One rectangular sub-region.
    Hyperslab(Hyperslab),
}

impl SourceSelection {
    /// Number of elements the selection covers for a dataspace with the
    /// given extents.
    pub fn num_elements(&self, extents: &[u64]) -> u64 {
        match self {
            SourceSelection::All => extents.iter().product(),
            SourceSelection::Hyperslab(slab) => slab.num_elements(),
        }
    }
}
