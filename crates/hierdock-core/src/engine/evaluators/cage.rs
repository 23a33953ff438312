use super::{CandidateScore, Evaluator};
use crate::core::models::body::{Body, ResidueRange, TrimDirection, clear_range};
use crate::core::models::cage::{CageArch, off_axis_elements};
use crate::core::models::xform::Xform;
use crate::core::scoring::summary::SummaryMethod;
use crate::core::scoring::table::{PairQuery, ScoreError, ScoreTable};
use crate::core::scoring::weights::Weights;
use crate::engine::config::{ConfigError, SearchConfig};
use crate::engine::trim::validate_trim;
use nalgebra::Vector3;

pub const CAGE2_INTERFACES: [&str; 1] = ["AB"];
pub const CAGE3_INTERFACES: [&str; 3] = ["AB", "AC", "BC"];

/// Interface labels of a cage with `ncomponents` components, one per component pair.
pub fn cage_interfaces(ncomponents: usize) -> &'static [&'static str] {
    if ncomponents == 3 {
        &CAGE3_INTERFACES
    } else {
        &CAGE2_INTERFACES
    }
}

/// Scores the components of a cage placed on the symmetry axes of its point group.
///
/// Every component is the monomer of a cyclic oligomer built about its local z axis. Copies
/// that share a component's axis form its own oligomer and are never checked against it; every
/// other copy in the cage is. Interface `XY` sums the contacts of component `X` with all copies
/// of component `Y`.
pub struct CageEvaluator<'a, B: Body, S: ScoreTable> {
    bodies: Vec<&'a B>,
    /// Trim direction of each component, `None` when it may not be trimmed.
    trim: Vec<Option<TrimDirection>>,
    axes: Vec<Vector3<f32>>,
    frames: Vec<Xform>,
    off_axis: Vec<Vec<usize>>,
    score: &'a S,
    config: &'a SearchConfig,
}

impl<'a, B: Body, S: ScoreTable> CageEvaluator<'a, B, S> {
    /// `directions[k]` overrides the configured trim direction of component `k`.
    pub fn new(
        arch: &CageArch,
        bodies: &[&'a B],
        directions: &[Option<TrimDirection>],
        score: &'a S,
        config: &'a SearchConfig,
    ) -> Result<Self, ConfigError> {
        if bodies.len() != arch.ncomponents() || directions.len() != bodies.len() {
            return Err(ConfigError::InvalidValue {
                param: "bodies",
                reason: format!(
                    "{arch} has {} components, got {} bodies and {} trim directions",
                    arch.ncomponents(),
                    bodies.len(),
                    directions.len()
                ),
            });
        }
        let frames = arch.group().elements();
        let axes = arch.axes();
        let trim = directions
            .iter()
            .enumerate()
            .map(|(k, d)| {
                (config.max_trim > 0 && config.is_trimmable(k))
                    .then(|| d.unwrap_or(config.trim_direction))
            })
            .collect();
        Ok(Self {
            off_axis: axes.iter().map(|a| off_axis_elements(&frames, a)).collect(),
            bodies: bodies.to_vec(),
            trim,
            axes,
            frames,
            score,
            config,
        })
    }

    pub fn frames(&self) -> &[Xform] {
        &self.frames
    }

    pub fn axes(&self) -> &[Vector3<f32>] {
        &self.axes
    }

    fn slides_too_uneven(&self, placement: &[Xform]) -> bool {
        let heights = placement
            .iter()
            .zip(&self.axes)
            .map(|(x, a)| x.translation.vector.dot(a));
        let (lo, hi) = heights.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), h| {
            (lo.min(h), hi.max(h))
        });
        hi - lo > self.config.max_delta_h
    }

    /// Records a clash between component `i` at `xi` and component `j` at `xj` on every side
    /// that may be trimmed. Returns `false` when neither side can absorb it.
    fn mark_clash(
        &self,
        (i, xi): (usize, &Xform),
        (j, xj): (usize, &Xform),
        clashes: &mut [Vec<bool>],
    ) -> bool {
        let dist = self.config.clash_dist;
        let (a, b) = (self.bodies[i], self.bodies[j]);
        if a.clash_ok(b, dist, xi, xj) {
            return true;
        }
        let mut absorbed = false;
        if self.trim[i].is_some() {
            or_into(&mut clashes[i], &a.clashing_residues(b, dist, xi, xj));
            absorbed = true;
        }
        if i != j && self.trim[j].is_some() {
            or_into(&mut clashes[j], &b.clashing_residues(a, dist, xj, xi));
            absorbed = true;
        }
        absorbed
    }

    /// Kept residues of every component, or `None` when the placement must be rejected.
    fn trimmed_ranges(&self, placement: &[Xform]) -> Option<Vec<ResidueRange>> {
        let n = self.bodies.len();
        let mut clashes: Vec<Vec<bool>> =
            self.bodies.iter().map(|b| vec![false; b.nres()]).collect();
        for i in 0..n {
            let xi = &placement[i];
            for &g in &self.off_axis[i] {
                let copy = self.frames[g] * xi;
                if !self.mark_clash((i, xi), (i, &copy), &mut clashes) {
                    return None;
                }
            }
            for j in (i + 1)..n {
                for frame in &self.frames {
                    let copy = frame * placement[j];
                    if !self.mark_clash((i, xi), (j, &copy), &mut clashes) {
                        return None;
                    }
                }
            }
        }

        let max_trim = self.config.max_trim;
        self.bodies
            .iter()
            .zip(&clashes)
            .zip(&self.trim)
            .map(|((body, flags), trim)| {
                let nres = body.nres();
                match trim {
                    Some(dir) => {
                        validate_trim(clear_range(flags, max_trim, *dir), nres, max_trim, *dir)
                    }
                    None => Some(ResidueRange::full(nres)),
                }
            })
            .collect()
    }
}

fn or_into(acc: &mut [bool], flags: &[bool]) {
    for (a, &f) in acc.iter_mut().zip(flags) {
        *a |= f;
    }
}

impl<B: Body, S: ScoreTable> Evaluator for CageEvaluator<'_, B, S> {
    /// One transform per component, in component order.
    type Placement = Vec<Xform>;

    fn interface_labels(&self) -> &[&'static str] {
        cage_interfaces(self.bodies.len())
    }

    fn interface_scores(
        &self,
        placement: &Vec<Xform>,
        level: usize,
        weights: &Weights,
    ) -> Result<CandidateScore, ScoreError> {
        let cfg = self.config;
        let nres: Vec<usize> = self.bodies.iter().map(|b| b.nres()).collect();
        let invalid = CandidateScore::invalid(self.interface_labels().len(), &nres);

        if placement.len() != self.bodies.len() || self.slides_too_uneven(placement) {
            return Ok(invalid);
        }
        let Some(ranges) = self.trimmed_ranges(placement) else {
            return Ok(invalid);
        };

        let n = self.bodies.len();
        let mut ifaces = Vec::with_capacity(self.interface_labels().len());
        for i in 0..n {
            for j in (i + 1)..n {
                let mut total = 0.0;
                for frame in &self.frames {
                    let copy = frame * placement[j];
                    total += self.score.score(
                        &PairQuery {
                            level,
                            body_a: self.bodies[i],
                            body_b: self.bodies[j],
                            xform_a: &placement[i],
                            xform_b: &copy,
                            range_a: ranges[i],
                            range_b: ranges[j],
                        },
                        weights,
                        &cfg.score_only_ss,
                    )?;
                }
                ifaces.push(total);
            }
        }

        Ok(CandidateScore {
            valid: true,
            ifaces,
            ranges,
        })
    }

    fn interface_weights(&self, _weights: &Weights) -> Vec<f32> {
        vec![1.0; self.interface_labels().len()]
    }

    fn summary(&self) -> SummaryMethod {
        self.config.iface_summary
    }
}
