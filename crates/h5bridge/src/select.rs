//! Region selection: a requested sub-region against a dataspace's extents.
//!
//! Selection only ever subsets the *source*: the destination is always the
//! dense region at the origin whose shape matches what was selected, so a
//! decoded buffer is laid out contiguously regardless of where the data
//! came from. Dimension order is the order given in the shape sequence;
//! there is exactly one rectangular region per call.

use h5bridge_store::{Dataspace, Hyperslab, SourceSelection};

use crate::error::{Result, SelectionError};

/// A validated (source selection, destination shape) pair for one read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// What to read from the source dataspace.
    pub source: SourceSelection,
    /// Shape of the dense in-memory destination.
    pub dest_shape: Vec<u64>,
}

impl Region {
    /// Number of elements the destination holds: the product of
    /// `dest_shape` (1 for rank 0).
    pub fn element_count(&self) -> u64 {
        self.dest_shape.iter().product()
    }
}

/// Resolve a requested sub-region (or "all") against a dataspace.
///
/// With no request the full extent is selected. A request must provide
/// `offset` and `count` together; each dimension must satisfy
/// `offset[d] + count[d] <= extent[d]`.
pub fn select(
    space: &Dataspace,
    offset: Option<&[u64]>,
    count: Option<&[u64]>,
) -> Result<Region> {
    match (offset, count) {
        (None, None) => Ok(Region {
            source: SourceSelection::All,
            dest_shape: space.extents.clone(),
        }),
        (Some(offset), Some(count)) => {
            let rank = space.rank();
            if offset.len() != rank {
                return Err(SelectionError::RankMismatch {
                    expected: rank,
                    actual: offset.len(),
                }
                .into());
            }
            if count.len() != rank {
                return Err(SelectionError::RankMismatch {
                    expected: rank,
                    actual: count.len(),
                }
                .into());
            }
            for (dim, &extent) in space.extents.iter().enumerate() {
                let end = offset[dim].checked_add(count[dim]);
                if end.map_or(true, |end| end > extent) {
                    return Err(SelectionError::OutOfRange {
                        dim,
                        offset: offset[dim],
                        count: count[dim],
                        extent,
                    }
                    .into());
                }
            }
            Ok(Region {
                source: SourceSelection::Hyperslab(Hyperslab {
                    offset: offset.to_vec(),
                    count: count.to_vec(),
                }),
                dest_shape: count.to_vec(),
            })
        }
        _ => Err(SelectionError::PartialRegion.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn no_request_selects_all() {
        let space = Dataspace::simple(&[4, 5]);
        let region = select(&space, None, None).unwrap();
        assert_eq!(region.source, SourceSelection::All);
        assert_eq!(region.dest_shape, vec![4, 5]);
        assert_eq!(region.element_count(), 20);
    }

    #[test]
    fn scalar_full_selection() {
        let region = select(&Dataspace::scalar(), None, None).unwrap();
        assert!(region.dest_shape.is_empty());
        assert_eq!(region.element_count(), 1);
    }

    #[test]
    fn hyperslab_dest_is_dense_at_origin() {
        let space = Dataspace::simple(&[5]);
        let region = select(&space, Some(&[1]), Some(&[2])).unwrap();
        assert_eq!(
            region.source,
            SourceSelection::Hyperslab(Hyperslab {
                offset: vec![1],
                count: vec![2],
            })
        );
        assert_eq!(region.dest_shape, vec![2]);
        assert_eq!(region.element_count(), 2);
    }

    #[test]
    fn element_count_is_product_of_counts() {
        let space = Dataspace::simple(&[10, 10, 10]);
        let region = select(&space, Some(&[0, 1, 2]), Some(&[2, 3, 4])).unwrap();
        assert_eq!(region.element_count(), 24);
    }

    #[test]
    fn partial_request_is_invalid() {
        let space = Dataspace::simple(&[5]);
        let err = select(&space, Some(&[1]), None).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSelection(SelectionError::PartialRegion)
        ));
        let err = select(&space, None, Some(&[1])).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSelection(SelectionError::PartialRegion)
        ));
    }

    #[test]
    fn rank_mismatch() {
        let space = Dataspace::simple(&[5, 5]);
        let err = select(&space, Some(&[1]), Some(&[2])).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSelection(SelectionError::RankMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn out_of_range() {
        let space = Dataspace::simple(&[5]);
        let err = select(&space, Some(&[4]), Some(&[2])).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSelection(SelectionError::OutOfRange {
                dim: 0,
                offset: 4,
                count: 2,
                extent: 5
            })
        ));
    }

    #[test]
    fn huge_offset_does_not_wrap_past_the_extent() {
        let space = Dataspace::simple(&[5]);
        let err = select(&space, Some(&[u64::MAX]), Some(&[2])).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSelection(SelectionError::OutOfRange { dim: 0, .. })
        ));
        let err = select(&space, Some(&[2]), Some(&[u64::MAX])).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSelection(SelectionError::OutOfRange { dim: 0, .. })
        ));
    }

    #[test]
    fn boundary_selection_is_valid() {
        let space = Dataspace::simple(&[5]);
        assert!(select(&space, Some(&[3]), Some(&[2])).is_ok());
        assert!(select(&space, Some(&[0]), Some(&[5])).is_ok());
    }
}
