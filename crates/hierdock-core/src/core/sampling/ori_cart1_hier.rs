use super::ori_hier::OriHier;
use super::{Hierarchy, HierarchyError, cell_fractions, index_depth, split_index};
use crate::core::models::xform::Xform;
use nalgebra::Translation3;

/// Coordinates refined per level: the x offset and 3 rotational.
pub const DIMS: u32 = 4;

/// Orientations × a single translation axis.
///
/// Placements are a rotation followed by an offset `(x, 0, 0)` with `x` in `[lb, ub]`. This is
/// the whole placement space of a monomer forming a cyclic oligomer about z: moving it along z
/// or around the axis yields an equivalent oligomer, so only the distance from the axis and the
/// orientation are sampled. Level-0 cells enumerate orientation fastest, then the x cells.
#[derive(Debug, Clone, PartialEq)]
pub struct OriCart1Hier {
    lb: f32,
    ub: f32,
    ncart: u64,
    cell_width: f32,
    ori: OriHier,
    depth: usize,
}

impl OriCart1Hier {
    pub fn new(lb: f32, ub: f32, ncart: u64, ori_resl_deg: f32) -> Result<Self, HierarchyError> {
        Self::with_orientations(lb, ub, ncart, OriHier::from_resolution(ori_resl_deg)?)
    }

    pub fn with_orientations(
        lb: f32,
        ub: f32,
        ncart: u64,
        ori: OriHier,
    ) -> Result<Self, HierarchyError> {
        if !(lb.is_finite() && ub.is_finite()) || ub <= lb {
            return Err(HierarchyError::SanityCheck(format!(
                "degenerate offset range: lower {lb} >= upper {ub}"
            )));
        }
        if ncart == 0 {
            return Err(HierarchyError::SanityCheck("zero offset cells".into()));
        }
        let ncell = ori.ncell().checked_mul(ncart).ok_or_else(|| {
            HierarchyError::SanityCheck("too many base cells to index".into())
        })?;
        Ok(Self {
            lb,
            ub,
            ncart,
            cell_width: (ub - lb) / ncart as f32,
            ori,
            depth: index_depth(ncell, DIMS)?,
        })
    }

    /// Offset cells at most `cart_resl` wide.
    pub fn from_resolution(
        lb: f32,
        ub: f32,
        cart_resl: f32,
        ori_resl_deg: f32,
    ) -> Result<Self, HierarchyError> {
        if !(cart_resl.is_finite() && cart_resl > 0.0) {
            return Err(HierarchyError::SanityCheck(format!(
                "cartesian resolution must be positive, got {cart_resl}"
            )));
        }
        let ncart = ((ub - lb) / cart_resl).ceil().max(1.0) as u64;
        Self::new(lb, ub, ncart, ori_resl_deg)
    }

    pub fn with_depth(mut self, depth: usize) -> Result<Self, HierarchyError> {
        if depth == 0 || depth > self.depth {
            return Err(HierarchyError::LevelOutOfRange {
                level: depth.saturating_sub(1),
                depth: self.depth,
            });
        }
        self.depth = depth;
        Ok(self)
    }

    pub fn lower(&self) -> f32 {
        self.lb
    }

    pub fn upper(&self) -> f32 {
        self.ub
    }

    pub fn cart_ncell(&self) -> u64 {
        self.ncart
    }

    pub fn ori_ncell(&self) -> u64 {
        self.ori.ncell()
    }

    pub fn cart_resolution(&self, level: usize) -> f32 {
        self.cell_width / (1u64 << level) as f32
    }

    pub fn ori_resolution(&self, level: usize) -> f32 {
        self.ori.resolution(level)
    }
}

impl Hierarchy for OriCart1Hier {
    type Placement = Xform;

    fn dims(&self) -> u32 {
        DIMS
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn ncell(&self) -> u64 {
        self.ncart * self.ori.ncell()
    }

    fn sanity_check(&self) -> bool {
        self.lb.is_finite()
            && self.ub > self.lb
            && self.ncart > 0
            && self.cell_width.is_finite()
            && self.cell_width > 0.0
            && self.depth > 0
    }

    fn placement_at(&self, level: usize, index: u64) -> Xform {
        let (cell, hier) = split_index(index, level, DIMS);
        let frac = cell_fractions(hier, level, DIMS);
        let ori_cell = cell % self.ori.ncell();
        let cart_cell = cell / self.ori.ncell();

        let x = self.lb + (cart_cell as f32 + frac(0)) * self.cell_width;
        let rotation = self.ori.rotation(ori_cell, [frac(1), frac(2), frac(3)]);
        Xform::from_parts(Translation3::new(x, 0.0, 0.0), rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampling::morton::tests::interleave;
    use std::collections::HashSet;

    fn small() -> OriCart1Hier {
        OriCart1Hier::new(0.0, 12.0, 6, 90.0).unwrap()
    }

    #[test]
    fn base_cells_cover_offsets_times_orientations() {
        let h = small();
        assert_eq!(h.ncell(), 6 * 24);
        assert_eq!(h.nchild(), 16);
        assert!(h.sanity_check());
        for level in 0..3 {
            assert_eq!(h.size(level + 1).unwrap(), h.size(level).unwrap() * 16);
        }
    }

    #[test]
    fn placements_never_leave_the_x_axis() {
        let h = small();
        for level in 0..3 {
            let n = h.size(level).unwrap().min(5000);
            for i in 0..n {
                let t = h.cell_to_placement(level, i).unwrap().translation.vector;
                assert_eq!((t.y, t.z), (0.0, 0.0));
                assert!(t.x > 0.0 && t.x < 12.0);
            }
        }
    }

    #[test]
    fn children_split_only_offset_and_orientation() {
        let h = small();
        let parent = 24 * 2 + 5;
        let px = h.cell_to_placement(0, parent).unwrap();
        let children = h.expand(0, &[parent]).unwrap();
        assert_eq!(children.len(), 16);

        let mut offsets = HashSet::new();
        for &child in &children {
            let cx = h.cell_to_placement(1, child).unwrap();
            assert!((cx.translation.x - px.translation.x).abs() <= 1.0 + 1e-4);
            offsets.insert((cx.translation.x * 1000.0).round() as i64);
        }
        // One halving along x: two distinct offsets, each shared by 8 orientation sub-cells.
        assert_eq!(offsets.len(), 2);

        // The x coordinate lives in bit 0 of each 4-bit group.
        let lo = h.cell_to_placement(1, (parent << 4) | interleave(&[0, 1, 1, 0], 1));
        let hi = h.cell_to_placement(1, (parent << 4) | interleave(&[1, 1, 1, 0], 1));
        let (lo, hi) = (lo.unwrap(), hi.unwrap());
        assert!((hi.translation.x - lo.translation.x - 1.0).abs() < 1e-4);
        assert!(lo.rotation.angle_to(&hi.rotation) < 1e-6);
    }

    #[test]
    fn cells_are_distinct_within_a_level() {
        let h = OriCart1Hier::new(0.0, 4.0, 1, 90.0).unwrap();
        let xs: Vec<Xform> = (0..h.size(1).unwrap())
            .map(|i| h.cell_to_placement(1, i).unwrap())
            .collect();
        for i in 0..xs.len() {
            for j in (i + 1)..xs.len() {
                let dt = (xs[i].translation.vector - xs[j].translation.vector).norm();
                let dr = xs[i].rotation.angle_to(&xs[j].rotation);
                assert!(dt > 1e-3 || dr > 1e-3, "cells {i} and {j} coincide");
            }
        }
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(OriCart1Hier::new(5.0, 5.0, 2, 90.0).is_err());
        assert!(OriCart1Hier::new(0.0, 5.0, 0, 90.0).is_err());
        assert!(OriCart1Hier::from_resolution(0.0, 5.0, -1.0, 90.0).is_err());
        assert_eq!(
            OriCart1Hier::from_resolution(0.0, 12.0, 2.0, 30.0)
                .unwrap()
                .cart_ncell(),
            6
        );
        assert!(small().with_depth(100).is_err());
        assert_eq!(
            small().with_depth(2).unwrap().size(2).unwrap_err(),
            HierarchyError::LevelOutOfRange { level: 2, depth: 2 }
        );
    }
}
