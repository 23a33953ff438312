use super::residue::SecondaryStructure;
use super::xform::Xform;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Inclusive residue index range `[lb, ub]` of a body that is kept after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResidueRange {
    pub lb: usize,
    pub ub: usize,
}

impl ResidueRange {
    pub fn new(lb: usize, ub: usize) -> Self {
        Self { lb, ub }
    }

    /// The untrimmed range of a body with `nres` residues.
    pub fn full(nres: usize) -> Self {
        Self {
            lb: 0,
            ub: nres.saturating_sub(1),
        }
    }

    pub fn len(&self) -> usize {
        self.ub + 1 - self.lb
    }

    pub fn is_empty(&self) -> bool {
        self.ub < self.lb
    }

    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        self.lb <= i && i <= self.ub
    }

    /// Number of residues removed from a body of `nres` residues.
    pub fn ntrimmed(&self, nres: usize) -> usize {
        self.lb + nres.saturating_sub(self.ub + 1)
    }
}

/// Terminus (or termini) from which residues may be trimmed to relieve a clash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrimDirection {
    #[serde(rename = "N")]
    N,
    #[serde(rename = "C")]
    C,
    #[default]
    #[serde(rename = "NC")]
    NC,
}

impl TrimDirection {
    pub fn allows_n(self) -> bool {
        matches!(self, Self::N | Self::NC)
    }

    pub fn allows_c(self) -> bool {
        matches!(self, Self::C | Self::NC)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid trim direction '{0}'. Expected 'N', 'C' or 'NC'.")]
pub struct TrimDirectionParseError(pub String);

impl FromStr for TrimDirection {
    type Err = TrimDirectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N" => Ok(Self::N),
            "C" => Ok(Self::C),
            "NC" | "CN" => Ok(Self::NC),
            _ => Err(TrimDirectionParseError(s.to_string())),
        }
    }
}

impl fmt::Display for TrimDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::N => "N",
            Self::C => "C",
            Self::NC => "NC",
        };
        f.write_str(s)
    }
}

/// The rigid-body geometry the search engine reads.
///
/// Every query takes explicit placements; implementations never consult their own working
/// placement ([`Body::position`]) when answering them. That placement is changed only by
/// [`Body::move_to`] on a private copy used for structure output.
pub trait Body: Clone + Send + Sync {
    fn label(&self) -> &str;

    fn nres(&self) -> usize;

    /// One representative point per residue, in the body's own frame.
    fn residue_centroids(&self) -> &[Point3<f32>];

    fn secondary_structure(&self) -> &[SecondaryStructure];

    /// Principal axes of the body in its own frame, longest first.
    fn pcavecs(&self) -> &[Vector3<f32>; 3];

    fn radius_max(&self) -> f32;

    fn rg_xy(&self) -> f32;

    fn rg_z(&self) -> f32;

    /// `true` when no atom of `self` placed at `xself` lies within `clash_dist` of an atom of
    /// `other` placed at `xother`.
    fn clash_ok(&self, other: &Self, clash_dist: f32, xself: &Xform, xother: &Xform) -> bool;

    /// Per-residue flags marking residues of `self` with an atom closer than `clash_dist` to
    /// any atom of `other`.
    fn clashing_residues(
        &self,
        other: &Self,
        clash_dist: f32,
        xself: &Xform,
        xother: &Xform,
    ) -> Vec<bool>;

    /// `(residue, squared distance)` of every residue centroid strictly closer than `radius` to
    /// `point`, where `point` is given in the body's own frame. Residues come in index order.
    fn centroids_near(&self, point: &Point3<f32>, radius: f32) -> Vec<(usize, f32)>;

    /// The trial clash-free residue range of `self` against `other`, trimming at most
    /// `max_trim` residues from the ends allowed by `direction`. `None` when no such range
    /// exists.
    fn intersect_range(
        &self,
        other: &Self,
        clash_dist: f32,
        max_trim: usize,
        direction: TrimDirection,
        xself: &Xform,
        xother: &Xform,
    ) -> Option<ResidueRange>;

    fn move_to(&mut self, xform: &Xform);

    fn position(&self) -> &Xform;
}

/// Longest contiguous run of non-clashing residues reachable by trimming at most `max_trim`
/// residues from the termini allowed by `direction`.
///
/// Equal-length candidates resolve to the one nearest the N terminus.
pub fn clear_range(
    clashes: &[bool],
    max_trim: usize,
    direction: TrimDirection,
) -> Option<ResidueRange> {
    let nres = clashes.len();
    if nres == 0 {
        return None;
    }
    if !clashes.iter().any(|&c| c) {
        return Some(ResidueRange::full(nres));
    }

    let mut best: Option<ResidueRange> = None;
    let mut start = 0;
    for i in 0..=nres {
        let boundary = i == nres || clashes[i];
        if !boundary {
            continue;
        }
        if i > start {
            let range = ResidueRange::new(start, i - 1);
            let trims_n = range.lb > 0;
            let trims_c = range.ub + 1 < nres;
            let allowed = (!trims_n || direction.allows_n()) && (!trims_c || direction.allows_c());
            if allowed
                && range.ntrimmed(nres) <= max_trim
                && best.is_none_or(|b| range.len() > b.len())
            {
                best = Some(range);
            }
        }
        start = i + 1;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(pattern: &str) -> Vec<bool> {
        pattern.chars().map(|c| c == 'x').collect()
    }

    #[test]
    fn residue_range_counts_trimmed_residues() {
        let r = ResidueRange::new(2, 7);
        assert_eq!(r.len(), 6);
        assert_eq!(r.ntrimmed(10), 4);
        assert_eq!(ResidueRange::full(10).ntrimmed(10), 0);
        assert!(r.contains(2) && r.contains(7) && !r.contains(8));
    }

    #[test]
    fn no_clash_keeps_full_range() {
        assert_eq!(
            clear_range(&flags("......"), 0, TrimDirection::NC),
            Some(ResidueRange::new(0, 5))
        );
    }

    #[test]
    fn n_terminal_trim_removes_through_last_clash() {
        let c = flags(".x.x......");
        assert_eq!(
            clear_range(&c, 4, TrimDirection::N),
            Some(ResidueRange::new(4, 9))
        );
        assert_eq!(clear_range(&c, 3, TrimDirection::N), None);
    }

    #[test]
    fn c_terminal_trim_removes_from_first_clash() {
        let c = flags("......x..x");
        assert_eq!(
            clear_range(&c, 4, TrimDirection::C),
            Some(ResidueRange::new(0, 5))
        );
        assert_eq!(clear_range(&c, 3, TrimDirection::C), None);
    }

    #[test]
    fn single_direction_cannot_remove_clash_at_opposite_terminus() {
        assert_eq!(clear_range(&flags(".....x"), 5, TrimDirection::N), None);
        assert_eq!(clear_range(&flags("x....."), 5, TrimDirection::C), None);
    }

    #[test]
    fn both_directions_pick_longest_gap_within_budget() {
        let c = flags("x.....x..");
        assert_eq!(
            clear_range(&c, 4, TrimDirection::NC),
            Some(ResidueRange::new(1, 5))
        );
        assert_eq!(
            clear_range(&c, 2, TrimDirection::NC),
            None
        );
    }

    #[test]
    fn both_directions_prefer_n_terminal_gap_on_ties() {
        let c = flags("...x...");
        assert_eq!(
            clear_range(&c, 4, TrimDirection::NC),
            Some(ResidueRange::new(0, 2))
        );
    }

    #[test]
    fn trim_direction_parses_and_displays() {
        assert_eq!("c".parse::<TrimDirection>().unwrap(), TrimDirection::C);
        assert_eq!("CN".parse::<TrimDirection>().unwrap(), TrimDirection::NC);
        assert!("X".parse::<TrimDirection>().is_err());
        assert_eq!(TrimDirection::NC.to_string(), "NC");
    }
}
