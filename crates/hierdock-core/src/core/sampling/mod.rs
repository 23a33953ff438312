//! Multi-resolution sampling of rigid-body placements.
//!
//! Every sampler implements [`Hierarchy`]: an immutable partition of some placement space whose
//! cells are addressed by `u64` indices and refine by halving each of `dims()` coordinates per
//! level.
//!
//! - [`xform_hier::XformHier`] couples a cartesian grid over a bounding box with the orientation
//!   grid of [`ori_hier::OriHier`]; every cell splits into 64 children.
//! - [`ori_cart1_hier::OriCart1Hier`] pairs the orientation grid with a single translation axis,
//!   for bodies whose remaining translations are fixed by symmetry; 16 children.
//! - [`multi_axis_hier::MultiAxisHier`] moves several symmetric components along and about their
//!   own axes at once; 16 or 64 children.

pub mod morton;
pub mod multi_axis_hier;
pub mod ori_cart1_hier;
pub mod ori_hier;
pub mod xform_hier;

use thiserror::Error;

/// Index bits usable before a level-`L` index would overflow.
pub(crate) const INDEX_BITS: u32 = 63;

/// Largest branching factor of any sampler; a beam must hold at least one expanded cell.
pub const MAX_NCHILD: u64 = 64;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HierarchyError {
    #[error("hierarchy sanity check failed: {0}")]
    SanityCheck(String),
    #[error("Resolution level {level} is out of range (hierarchy depth {depth})")]
    LevelOutOfRange { level: usize, depth: usize },
    #[error("Cell index {index} is out of range at level {level} (size {size})")]
    IndexOutOfRange { level: usize, index: u64, size: u64 },
}

/// An indexable, immutable multi-resolution partition of a placement space.
///
/// A cell index at level `L` is `base_cell << (dims · L) | hier`, where `base_cell` enumerates
/// the level-0 cells and `hier` is the z-order path of the sub-cell.
pub trait Hierarchy: Sync {
    /// What a cell decodes to: one transform, or one per moving body.
    type Placement: Clone + Send + Sync;

    /// Coordinates halved at every level.
    fn dims(&self) -> u32;

    /// Number of usable levels.
    fn depth(&self) -> usize;

    /// Number of level-0 cells.
    fn ncell(&self) -> u64;

    fn sanity_check(&self) -> bool;

    /// Representative placement of a cell whose index is already known to be in range.
    fn placement_at(&self, level: usize, index: u64) -> Self::Placement;

    fn nchild(&self) -> u64 {
        1 << self.dims()
    }

    fn check_level(&self, level: usize) -> Result<(), HierarchyError> {
        if level >= self.depth() {
            return Err(HierarchyError::LevelOutOfRange {
                level,
                depth: self.depth(),
            });
        }
        Ok(())
    }

    fn size(&self, level: usize) -> Result<u64, HierarchyError> {
        self.check_level(level)?;
        Ok(self.ncell() << (self.dims() as usize * level))
    }

    fn cell_to_placement(
        &self,
        level: usize,
        index: u64,
    ) -> Result<Self::Placement, HierarchyError> {
        let size = self.size(level)?;
        if index >= size {
            return Err(HierarchyError::IndexOutOfRange { level, index, size });
        }
        Ok(self.placement_at(level, index))
    }

    fn cell_to_placements(
        &self,
        level: usize,
        indices: &[u64],
    ) -> Result<Vec<Self::Placement>, HierarchyError> {
        let size = self.size(level)?;
        indices
            .iter()
            .map(|&index| {
                if index >= size {
                    return Err(HierarchyError::IndexOutOfRange { level, index, size });
                }
                Ok(self.placement_at(level, index))
            })
            .collect()
    }

    /// Children at `level + 1` of every index at `level`, [`Hierarchy::nchild`] per parent in
    /// parent order.
    fn expand(&self, level: usize, indices: &[u64]) -> Result<Vec<u64>, HierarchyError> {
        self.check_level(level + 1)?;
        let size = self.size(level)?;
        let nchild = self.nchild();
        let mut children = Vec::with_capacity(indices.len() * nchild as usize);
        for &index in indices {
            if index >= size {
                return Err(HierarchyError::IndexOutOfRange { level, index, size });
            }
            let first = index << self.dims();
            children.extend(first..first + nchild);
        }
        Ok(children)
    }
}

/// Deepest level count whose indices still fit in [`INDEX_BITS`], or an error when even the
/// base cells do not.
pub(crate) fn index_depth(ncell: u64, dims: u32) -> Result<usize, HierarchyError> {
    let ncell_bits = u64::BITS - ncell.leading_zeros();
    if ncell == 0 || ncell_bits > INDEX_BITS {
        return Err(HierarchyError::SanityCheck(format!(
            "cannot index {ncell} base cells"
        )));
    }
    Ok(((INDEX_BITS - ncell_bits) / dims) as usize + 1)
}

/// Splits a z-order path into per-dimension fractional positions in `(0, 1)`: the center of the
/// sub-cell along each of the `dims` coordinates.
pub(crate) fn cell_fractions(hier: u64, level: usize, dims: u32) -> impl Fn(u32) -> f32 {
    let scale = (1u64 << level) as f32;
    move |dim| (morton::coordinate(hier, dim, level as u32, dims) as f32 + 0.5) / scale
}

/// Splits `index` at `level` into its base cell and its z-order path.
#[inline]
pub(crate) fn split_index(index: u64, level: usize, dims: u32) -> (u64, u64) {
    let shift = dims as usize * level;
    (index >> shift, index & ((1u64 << shift) - 1))
}
