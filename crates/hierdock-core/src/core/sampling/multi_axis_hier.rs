use super::{Hierarchy, HierarchyError, cell_fractions, index_depth, split_index};
use crate::core::models::xform::{self, Xform};
use nalgebra::{Translation3, Unit, UnitQuaternion, Vector3};
use std::f32::consts::PI;

/// Most components a single search can move together.
pub const MAX_COMPONENTS: usize = 3;

/// One symmetric component riding on its own axis.
///
/// The component is built around its local z axis. It slides along `axis` over `[lb, ub]` and
/// spins about it over one `360 / nfold` period; with `flip` it is also tried upside down.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisComponent {
    pub nfold: u32,
    pub axis: Vector3<f32>,
    pub lb: f32,
    pub ub: f32,
    pub flip: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Grid {
    align: UnitQuaternion<f32>,
    lb: f32,
    cart_width: f32,
    rot_width: f32,
    ncart: u64,
    nrot: u64,
    nflip: u64,
}

impl Grid {
    fn ncell(&self) -> u64 {
        self.ncart * self.nrot * self.nflip
    }

    fn placement(&self, cell: u64, slide_frac: f32, spin_frac: f32) -> Xform {
        let rot = cell % self.nrot;
        let cart = (cell / self.nrot) % self.ncart;
        let flipped = cell / (self.nrot * self.ncart) == 1;

        let d = self.lb + (cart as f32 + slide_frac) * self.cart_width;
        let theta = (rot as f32 + spin_frac) * self.rot_width;
        let mut x = Xform::from_parts(Translation3::identity(), self.align)
            * Xform::translation(0.0, 0.0, d)
            * xform::rotation_about_z(theta);
        if flipped {
            x *= xform::rotation_about_axis(&Vector3::x(), 180.0);
        }
        x
    }
}

/// Slides and spins of up to [`MAX_COMPONENTS`] components, each along its own axis.
///
/// Coordinate `2k` is the slide of component `k` and `2k + 1` its spin, so a cell has
/// `4^ncomp` children. Level-0 cells enumerate component 0 fastest; within a component the
/// spin cell varies fastest, then the slide cell, then the flip.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiAxisHier {
    grids: Vec<Grid>,
    ncell: u64,
    depth: usize,
}

impl MultiAxisHier {
    /// Slide cells at most `cart_resl` wide and spin cells at most `ori_resl_deg` wide.
    pub fn new(
        components: &[AxisComponent],
        cart_resl: f32,
        ori_resl_deg: f32,
    ) -> Result<Self, HierarchyError> {
        if components.is_empty() || components.len() > MAX_COMPONENTS {
            return Err(HierarchyError::SanityCheck(format!(
                "{} components; between 1 and {MAX_COMPONENTS} can be sampled together",
                components.len()
            )));
        }
        for (name, resl) in [("cartesian", cart_resl), ("orientation", ori_resl_deg)] {
            if !(resl.is_finite() && resl > 0.0) {
                return Err(HierarchyError::SanityCheck(format!(
                    "{name} resolution must be positive, got {resl}"
                )));
            }
        }

        let grids = components
            .iter()
            .map(|c| grid(c, cart_resl, ori_resl_deg))
            .collect::<Result<Vec<_>, _>>()?;
        let ncell = grids
            .iter()
            .try_fold(1u64, |acc, g| acc.checked_mul(g.ncell()))
            .ok_or_else(|| HierarchyError::SanityCheck("too many base cells to index".into()))?;
        let dims = 2 * grids.len() as u32;
        Ok(Self {
            depth: index_depth(ncell, dims)?,
            grids,
            ncell,
        })
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

    pub fn ncomponents(&self) -> usize {
        self.grids.len()
    }

    /// `(slide cells, spin cells, flips)` of component `k`.
    pub fn component_cells(&self, k: usize) -> Option<(u64, u64, u64)> {
        self.grids.get(k).map(|g| (g.ncart, g.nrot, g.nflip))
    }
}

fn grid(c: &AxisComponent, cart_resl: f32, ori_resl_deg: f32) -> Result<Grid, HierarchyError> {
    if c.nfold < 2 {
        return Err(HierarchyError::SanityCheck(format!(
            "component symmetry must be at least 2-fold, got {}",
            c.nfold
        )));
    }
    if !(c.lb.is_finite() && c.ub.is_finite()) || c.ub <= c.lb {
        return Err(HierarchyError::SanityCheck(format!(
            "degenerate slide range: lower {} >= upper {}",
            c.lb, c.ub
        )));
    }
    let axis = Unit::try_new(c.axis, 1e-6).ok_or_else(|| {
        HierarchyError::SanityCheck("component axis must be a non-zero vector".into())
    })?;
    let align = UnitQuaternion::rotation_between(&Vector3::z(), &axis)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI));

    let period = 360.0 / c.nfold as f32;
    let ncart = ((c.ub - c.lb) / cart_resl).ceil().max(1.0) as u64;
    let nrot = (period / ori_resl_deg).ceil().max(1.0) as u64;
    Ok(Grid {
        align,
        lb: c.lb,
        cart_width: (c.ub - c.lb) / ncart as f32,
        rot_width: period / nrot as f32,
        ncart,
        nrot,
        nflip: if c.flip { 2 } else { 1 },
    })
}

impl Hierarchy for MultiAxisHier {
    /// One transform per component, in component order.
    type Placement = Vec<Xform>;

    fn dims(&self) -> u32 {
        2 * self.grids.len() as u32
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn ncell(&self) -> u64 {
        self.ncell
    }

    fn sanity_check(&self) -> bool {
        !self.grids.is_empty()
            && self.grids.len() <= MAX_COMPONENTS
            && self.grids.iter().all(|g| {
                g.cart_width.is_finite()
                    && g.cart_width > 0.0
                    && g.rot_width > 0.0
                    && g.ncell() > 0
            })
            && self.depth > 0
    }

    fn placement_at(&self, level: usize, index: u64) -> Vec<Xform> {
        let dims = self.dims();
        let (mut cell, hier) = split_index(index, level, dims);
        let frac = cell_fractions(hier, level, dims);
        self.grids
            .iter()
            .enumerate()
            .map(|(k, g)| {
                let own = cell % g.ncell();
                cell /= g.ncell();
                let k = k as u32;
                g.placement(own, frac(2 * k), frac(2 * k + 1))
            })
            .collect()
    }
}
