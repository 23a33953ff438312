use super::{CandidateScore, Evaluator};
use crate::core::models::body::{Body, ResidueRange};
use crate::core::models::symmetry::Symmetry;
use crate::core::models::xform::Xform;
use crate::core::scoring::summary::SummaryMethod;
use crate::core::scoring::table::{PairQuery, ScoreError, ScoreTable};
use crate::core::scoring::weights::Weights;
use crate::engine::config::SearchConfig;
use crate::engine::trim::validate_trim;

pub const CYCLIC_INTERFACES: [&str; 1] = ["self"];

/// Scores a monomer forming a cyclic oligomer with its own symmetric copies.
///
/// Trimming is applied identically to every copy. The clash flags are computed against the
/// untrimmed neighbor, so the kept range is conservative.
pub struct CyclicEvaluator<'a, B: Body, S: ScoreTable> {
    body: &'a B,
    score: &'a S,
    symrot: Xform,
    config: &'a SearchConfig,
}

impl<'a, B: Body, S: ScoreTable> CyclicEvaluator<'a, B, S> {
    pub fn new(body: &'a B, sym: &Symmetry, score: &'a S, config: &'a SearchConfig) -> Self {
        Self {
            body,
            score,
            symrot: sym.symrot(),
            config,
        }
    }
}

impl<B: Body, S: ScoreTable> Evaluator for CyclicEvaluator<'_, B, S> {
    type Placement = Xform;

    fn interface_labels(&self) -> &[&'static str] {
        &CYCLIC_INTERFACES
    }

    fn interface_scores(
        &self,
        xform: &Xform,
        level: usize,
        weights: &Weights,
    ) -> Result<CandidateScore, ScoreError> {
        let cfg = self.config;
        let nres = self.body.nres();
        let invalid = CandidateScore::invalid(CYCLIC_INTERFACES.len(), &[nres]);

        let long_axis = xform.rotation * self.body.pcavecs()[0];
        if long_axis.z.abs() > cfg.max_longaxis_dot_z {
            return Ok(invalid);
        }

        let xsym = self.symrot * xform;
        let range = if cfg.max_trim > 0 {
            let trial = self.body.intersect_range(
                self.body,
                cfg.clash_dist,
                cfg.max_trim,
                cfg.trim_direction,
                xform,
                &xsym,
            );
            validate_trim(trial, nres, cfg.max_trim, cfg.trim_direction)
        } else {
            self.body
                .clash_ok(self.body, cfg.clash_dist, xform, &xsym)
                .then(|| ResidueRange::full(nres))
        };
        let Some(range) = range else {
            return Ok(invalid);
        };

        let iface = self.score.score(
            &PairQuery {
                level,
                body_a: self.body,
                body_b: self.body,
                xform_a: xform,
                xform_b: &xsym,
                range_a: range,
                range_b: range,
            },
            weights,
            &cfg.score_only_ss,
        )?;

        Ok(CandidateScore {
            valid: true,
            ifaces: vec![iface],
            ranges: vec![range],
        })
    }

    fn interface_weights(&self, _weights: &Weights) -> Vec<f32> {
        vec![1.0]
    }

    fn summary(&self) -> SummaryMethod {
        self.config.iface_summary
    }
}
