//! Dataspace: the shape descriptor of a dataset or attribute.

use serde::Serialize;

/// An ordered sequence of unsigned dimension extents.
///
/// Rank 0 (no extents) is a scalar holding exactly one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataspace {
    /// Current extent of each dimension, outermost first.
    pub extents: Vec<u64>,
}

impl Dataspace {
    /// A scalar dataspace (rank 0, one element).
    pub fn scalar() -> Self {
        Dataspace { extents: Vec::new() }
    }

    /// A simple dataspace with the given extents.
    pub fn simple(extents: &[u64]) -> Self {
        Dataspace {
            extents: extents.to_vec(),
        }
    }

    /// Number of dimensions. Scalars have rank 0.
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    /// Total number of elements: the product of the extents, 1 for scalars.
    pub fn num_elements(&self) -> u64 {
        self.extents.iter().product()
    }
}
