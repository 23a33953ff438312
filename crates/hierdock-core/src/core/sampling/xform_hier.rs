use super::ori_hier::OriHier;
use super::{Hierarchy, HierarchyError, cell_fractions, index_depth, split_index};
use crate::core::models::xform::Xform;
use nalgebra::{Translation3, Vector3};

/// Coordinates refined per level: 3 translational and 3 rotational.
pub const DIMS: u32 = 6;

/// Number of children of every cell.
pub const NCHILD: u64 = 1 << DIMS;

/// Multi-resolution partition of a translation box × the rotation group.
///
/// Level-0 cells enumerate orientation fastest, then the cartesian cells along x, y and z.
/// Indices are pure lookup keys; the hierarchy is immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct XformHier {
    lb: Vector3<f32>,
    ub: Vector3<f32>,
    bs: [u64; 3],
    cell_width: Vector3<f32>,
    ori: OriHier,
    depth: usize,
}

impl XformHier {
    /// Builds a hierarchy over the box `[lb, ub]` split into `bs` base cells per axis, with the
    /// orientation grid chosen to cover `ori_resl_deg`.
    pub fn new(
        lb: [f32; 3],
        ub: [f32; 3],
        bs: [u64; 3],
        ori_resl_deg: f32,
    ) -> Result<Self, HierarchyError> {
        let ori = OriHier::from_resolution(ori_resl_deg)?;
        Self::with_orientations(lb, ub, bs, ori)
    }

    pub fn with_orientations(
        lb: [f32; 3],
        ub: [f32; 3],
        bs: [u64; 3],
        ori: OriHier,
    ) -> Result<Self, HierarchyError> {
        let lb = Vector3::from(lb);
        let ub = Vector3::from(ub);
        let cell_width = Vector3::from_fn(|d, _| (ub[d] - lb[d]) / bs[d].max(1) as f32);
        let mut hier = Self {
            lb,
            ub,
            bs,
            cell_width,
            ori,
            depth: 0,
        };
        hier.validate()?;
        hier.depth = index_depth(hier.ncell(), DIMS)?;
        Ok(hier)
    }

    /// Builds a hierarchy whose base cells are at most `cart_resl` wide along each axis.
    pub fn from_resolution(
        lb: [f32; 3],
        ub: [f32; 3],
        cart_resl: f32,
        ori_resl_deg: f32,
    ) -> Result<Self, HierarchyError> {
        if !(cart_resl.is_finite() && cart_resl > 0.0) {
            return Err(HierarchyError::SanityCheck(format!(
                "cartesian resolution must be positive, got {cart_resl}"
            )));
        }
        let bs = [0, 1, 2].map(|d| ((ub[d] - lb[d]) / cart_resl).ceil().max(1.0) as u64);
        Self::new(lb, ub, bs, ori_resl_deg)
    }

    /// Limits the number of usable levels to `depth`.
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

    fn validate(&self) -> Result<(), HierarchyError> {
        let fail = |msg: String| Err(HierarchyError::SanityCheck(msg));
        for d in 0..3 {
            if !(self.lb[d].is_finite() && self.ub[d].is_finite()) {
                return fail(format!("box bound on axis {d} is not finite"));
            }
            if self.ub[d] <= self.lb[d] {
                return fail(format!(
                    "degenerate box on axis {d}: lower {} >= upper {}",
                    self.lb[d], self.ub[d]
                ));
            }
            if self.bs[d] == 0 {
                return fail(format!("zero base cells on axis {d}"));
            }
        }
        let ncell = self
            .bs
            .iter()
            .try_fold(self.ori.ncell(), |acc, &b| acc.checked_mul(b));
        match ncell {
            Some(n) => index_depth(n, DIMS).map(|_| ()),
            None => fail("too many base cells to index".into()),
        }
    }

    pub fn lower(&self) -> [f32; 3] {
        self.lb.into()
    }

    pub fn upper(&self) -> [f32; 3] {
        self.ub.into()
    }

    pub fn cart_bs(&self) -> [u64; 3] {
        self.bs
    }

    pub fn ori(&self) -> &OriHier {
        &self.ori
    }

    pub fn cart_ncell(&self) -> u64 {
        self.bs.iter().product()
    }

    pub fn ori_ncell(&self) -> u64 {
        self.ori.ncell()
    }

    /// Largest cell edge along any translational axis at `level`.
    pub fn cart_resolution(&self, level: usize) -> f32 {
        self.cell_width.max() / (1u64 << level) as f32
    }

    pub fn ori_resolution(&self, level: usize) -> f32 {
        self.ori.resolution(level)
    }

    pub fn cell_to_transform(&self, level: usize, index: u64) -> Result<Xform, HierarchyError> {
        self.cell_to_placement(level, index)
    }
}

impl Hierarchy for XformHier {
    type Placement = Xform;

    fn dims(&self) -> u32 {
        DIMS
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn ncell(&self) -> u64 {
        self.cart_ncell() * self.ori_ncell()
    }

    /// `true` when the box is non-degenerate, cell counts are positive and resolutions are
    /// positive.
    fn sanity_check(&self) -> bool {
        self.validate().is_ok()
            && self.cell_width.iter().all(|w| w.is_finite() && *w > 0.0)
            && self.depth > 0
    }

    fn placement_at(&self, level: usize, index: u64) -> Xform {
        let (cell, hier) = split_index(index, level, DIMS);
        let frac = cell_fractions(hier, level, DIMS);

        let ori_cell = cell % self.ori_ncell();
        let cart_cell = cell / self.ori_ncell();
        let [bx, by, _] = self.bs;
        let cc = [cart_cell % bx, (cart_cell / bx) % by, cart_cell / (bx * by)];

        let t = Vector3::from_fn(|d, _| {
            self.lb[d] + (cc[d] as f32 + frac(d as u32)) * self.cell_width[d]
        });
        let rotation = self.ori.rotation(ori_cell, [frac(3), frac(4), frac(5)]);
        Xform::from_parts(Translation3::from(t), rotation)
    }
}
