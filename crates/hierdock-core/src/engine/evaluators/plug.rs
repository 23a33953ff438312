use super::{CandidateScore, Evaluator};
use crate::core::models::body::{Body, ResidueRange};
use crate::core::models::symmetry::Symmetry;
use crate::core::models::xform::Xform;
use crate::core::scoring::summary::SummaryMethod;
use crate::core::scoring::table::{PairQuery, ScoreError, ScoreTable};
use crate::core::scoring::weights::Weights;
use crate::engine::config::SearchConfig;
use crate::engine::trim::validate_trim;

/// Self-interface score reported when the plug oligomer is held fixed, so that a `min`
/// summary is gated by the hole interface alone.
pub const FIXED_OLIG_SENTINEL: f32 = 9999.0;

pub const PLUG_INTERFACES: [&str; 2] = ["plug", "hole"];

/// Scores a plug monomer placed inside the hole of a cyclic oligomer.
///
/// The hole stays at the identity; the plug's own oligomer is generated by the hole's symmetry
/// operator about z.
pub struct PlugEvaluator<'a, B: Body, S: ScoreTable> {
    plug: &'a B,
    hole: &'a B,
    score: &'a S,
    symrot: Xform,
    config: &'a SearchConfig,
}

impl<'a, B: Body, S: ScoreTable> PlugEvaluator<'a, B, S> {
    pub fn new(
        plug: &'a B,
        hole: &'a B,
        hole_sym: &Symmetry,
        score: &'a S,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            plug,
            hole,
            score,
            symrot: hole_sym.symrot(),
            config,
        }
    }

    fn is_flat(&self, xform: &Xform) -> bool {
        let long_axis = xform.rotation * self.plug.pcavecs()[0];
        long_axis.z.abs() <= self.config.max_longaxis_dot_z
    }

    /// Plug residue range that avoids the hole, or `None` when the placement must be rejected.
    fn trimmed_range(&self, xform: &Xform) -> Option<ResidueRange> {
        let cfg = self.config;
        let hole_xform = Xform::identity();
        let nres = self.plug.nres();
        if cfg.max_trim > 0 {
            let trial = self.plug.intersect_range(
                self.hole,
                cfg.clash_dist,
                cfg.max_trim,
                cfg.trim_direction,
                xform,
                &hole_xform,
            );
            validate_trim(trial, nres, cfg.max_trim, cfg.trim_direction)
        } else if self
            .plug
            .clash_ok(self.hole, cfg.clash_dist, xform, &hole_xform)
        {
            Some(ResidueRange::full(nres))
        } else {
            None
        }
    }
}

impl<B: Body, S: ScoreTable> Evaluator for PlugEvaluator<'_, B, S> {
    type Placement = Xform;

    fn interface_labels(&self) -> &[&'static str] {
        &PLUG_INTERFACES
    }

    fn interface_scores(
        &self,
        xform: &Xform,
        level: usize,
        weights: &Weights,
    ) -> Result<CandidateScore, ScoreError> {
        let cfg = self.config;
        let invalid = CandidateScore::invalid(PLUG_INTERFACES.len(), &[self.plug.nres()]);

        if !self.is_flat(xform) {
            return Ok(invalid);
        }

        let xsym = self.symrot * xform;
        if !cfg.plug_fixed_olig
            && !self
                .plug
                .clash_ok(self.plug, cfg.clash_dist, xform, &xsym)
        {
            return Ok(invalid);
        }

        let Some(range) = self.trimmed_range(xform) else {
            return Ok(invalid);
        };

        let self_iface = if cfg.plug_fixed_olig {
            FIXED_OLIG_SENTINEL
        } else {
            self.score.score(
                &PairQuery {
                    level,
                    body_a: self.plug,
                    body_b: self.plug,
                    xform_a: xform,
                    xform_b: &xsym,
                    range_a: range,
                    range_b: range,
                },
                weights,
                &cfg.score_only_ss,
            )?
        };

        let hole_xform = Xform::identity();
        let hole_iface = self.score.score(
            &PairQuery {
                level,
                body_a: self.plug,
                body_b: self.hole,
                xform_a: xform,
                xform_b: &hole_xform,
                range_a: range,
                range_b: ResidueRange::full(self.hole.nres()),
            },
            weights,
            &cfg.score_only_ss,
        )?;

        Ok(CandidateScore {
            valid: true,
            ifaces: vec![self_iface, hole_iface],
            ranges: vec![range],
        })
    }

    fn interface_weights(&self, weights: &Weights) -> Vec<f32> {
        vec![weights.plug, weights.hole]
    }

    fn summary(&self) -> SummaryMethod {
        self.config.iface_summary
    }
}
