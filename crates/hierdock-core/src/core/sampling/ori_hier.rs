use super::HierarchyError;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

const H: f32 = 0.5;
const S: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// The 24 proper rotations of the cube as `(w, x, y, z)` quaternions.
const CUBE_ROTATIONS: [[f32; 4]; 24] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
    [H, H, H, H],
    [H, H, H, -H],
    [H, H, -H, H],
    [H, H, -H, -H],
    [H, -H, H, H],
    [H, -H, H, -H],
    [H, -H, -H, H],
    [H, -H, -H, -H],
    [S, S, 0.0, 0.0],
    [S, -S, 0.0, 0.0],
    [S, 0.0, S, 0.0],
    [S, 0.0, -S, 0.0],
    [S, 0.0, 0.0, S],
    [S, 0.0, 0.0, -S],
    [0.0, S, S, 0.0],
    [0.0, S, -S, 0.0],
    [0.0, S, 0.0, S],
    [0.0, S, 0.0, -S],
    [0.0, 0.0, S, S],
    [0.0, 0.0, S, -S],
];

/// Edge of the cube (in quaternion vector-part space, `w = 1`) that covers one cube-rotation
/// cell: rotations up to 45 degrees about each axis.
const CELL_WIDTH: f32 = 2.0 * (std::f32::consts::SQRT_2 - 1.0);

/// Covering radius in degrees of the base orientation grid for `nside = 1, 2, ...`.
const COVERING_RADIUS_DEG: [f32; 20] = [
    62.71, 37.01, 24.96, 19.25, 15.38, 12.66, 10.87, 9.50, 8.42, 7.59, 6.88, 6.30, 5.80, 5.38,
    5.02, 4.70, 4.42, 4.17, 3.95, 3.75,
];

/// Orientation part of the transform hierarchy.
///
/// Rotation space is split into 24 cube-rotation cells, each subdivided into `nside³` sub-cells
/// of a cube in quaternion vector space. Every sub-cell refines by halving along each of the
/// three rotational axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriHier {
    nside: u64,
    ncell: u64,
}

impl OriHier {
    /// The coarsest grid whose covering radius does not exceed `resl_deg`.
    pub fn from_resolution(resl_deg: f32) -> Result<Self, HierarchyError> {
        if !(resl_deg.is_finite() && resl_deg > 0.0) {
            return Err(HierarchyError::SanityCheck(format!(
                "orientation resolution must be positive, got {resl_deg}"
            )));
        }
        let nside = match COVERING_RADIUS_DEG.iter().position(|&r| r <= resl_deg) {
            Some(i) => i as u64 + 1,
            None => (75.0 / resl_deg).ceil().max(COVERING_RADIUS_DEG.len() as f32 + 1.0) as u64,
        };
        Self::with_nside(nside)
    }

    pub fn with_nside(nside: u64) -> Result<Self, HierarchyError> {
        if nside == 0 {
            return Err(HierarchyError::SanityCheck(
                "orientation grid needs at least one side division".into(),
            ));
        }
        let ncell = nside
            .checked_pow(3)
            .and_then(|n| n.checked_mul(CUBE_ROTATIONS.len() as u64))
            .ok_or_else(|| {
                HierarchyError::SanityCheck(format!(
                    "orientation grid with {nside} side divisions has too many cells"
                ))
            })?;
        Ok(Self { nside, ncell })
    }

    pub fn nside(&self) -> u64 {
        self.nside
    }

    pub fn ncell(&self) -> u64 {
        self.ncell
    }

    /// Approximate covering radius in degrees of cells at `level`.
    pub fn resolution(&self, level: usize) -> f32 {
        let base = COVERING_RADIUS_DEG
            .get(self.nside as usize - 1)
            .copied()
            .unwrap_or(75.0 / self.nside as f32);
        base / (1u64 << level) as f32
    }

    /// Rotation at fractional position `frac` (each component in `[0, 1)`) inside base cell `cell`.
    pub fn rotation(&self, cell: u64, frac: [f32; 3]) -> UnitQuaternion<f32> {
        let n = self.nside;
        let sub_cells = n * n * n;
        let h = (cell / sub_cells) as usize;
        let sub = cell % sub_cells;
        let ijk = [sub % n, (sub / n) % n, sub / (n * n)];

        let nf = n as f32;
        let v = Vector3::from_fn(|d, _| CELL_WIDTH * ((ijk[d] as f32 + frac[d]) / nf - 0.5));
        let local = UnitQuaternion::from_quaternion(Quaternion::new(1.0, v.x, v.y, v.z));

        let [w, x, y, z] = CUBE_ROTATIONS[h % CUBE_ROTATIONS.len()];
        let base = UnitQuaternion::new_unchecked(Quaternion::new(w, x, y, z));
        base * local
    }
}
