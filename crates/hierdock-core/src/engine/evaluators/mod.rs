//! Per-candidate evaluation for each docking protocol.
//!
//! An [`Evaluator`] turns one placement into per-interface scores plus a validity flag and the
//! trimmed residue range of every moving body; [`Evaluator::evaluate`] runs it over a whole level
//! in parallel.

pub mod cage;
pub mod cyclic;
pub mod plug;

use super::batch::Evaluation;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::body::ResidueRange;
use crate::core::scoring::summary::SummaryMethod;
use crate::core::scoring::table::ScoreError;
use crate::core::scoring::weights::Weights;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Candidates handed to one worker at a time.
const CHUNK_SIZE: usize = 4096;

/// Raw per-interface outcome of a single placement.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub valid: bool,
    pub ifaces: Vec<f32>,
    /// Kept residues of each moving body.
    pub ranges: Vec<ResidueRange>,
}

impl CandidateScore {
    /// A rejected candidate; `nres` holds the residue count of each moving body.
    pub fn invalid(ninterfaces: usize, nres: &[usize]) -> Self {
        Self {
            valid: false,
            ifaces: vec![0.0; ninterfaces],
            ranges: nres.iter().map(|&n| ResidueRange::full(n)).collect(),
        }
    }
}

pub trait Evaluator: Sync {
    /// What the sampler hands over per candidate.
    type Placement: Sync;

    fn interface_labels(&self) -> &[&'static str];

    /// Per-interface scores of one placement at `level`, weighted with `weights.rpx` and
    /// `weights.ncontact` but not yet with the interface weights.
    ///
    /// Geometric rejections are reported through [`CandidateScore::valid`]; only setup problems
    /// such as an unknown score level surface as errors.
    fn interface_scores(
        &self,
        placement: &Self::Placement,
        level: usize,
        weights: &Weights,
    ) -> Result<CandidateScore, ScoreError>;

    /// Weight applied to each interface before the summary reduction.
    fn interface_weights(&self, weights: &Weights) -> Vec<f32>;

    fn summary(&self) -> SummaryMethod;

    /// The scalar candidate score; 0 for invalid candidates.
    fn combine(&self, candidate: &CandidateScore, weights: &Weights) -> f32 {
        if !candidate.valid {
            return 0.0;
        }
        let weighted: Vec<f32> = candidate
            .ifaces
            .iter()
            .zip(self.interface_weights(weights))
            .map(|(s, w)| s * w)
            .collect();
        self.summary().reduce(&weighted)
    }

    /// Evaluates a batch of placements. Output order matches `placements` regardless of how the
    /// work is split across threads.
    fn evaluate(
        &self,
        placements: &[Self::Placement],
        level: usize,
        weights: &Weights,
        reporter: &ProgressReporter,
    ) -> Result<Evaluation, EngineError> {
        type Scored = (f32, bool, Vec<ResidueRange>);
        let score_chunk = |chunk: &[Self::Placement]| -> Result<Vec<Scored>, ScoreError> {
            let out = chunk
                .iter()
                .map(|p| -> Result<_, ScoreError> {
                    let c = self.interface_scores(p, level, weights)?;
                    Ok((self.combine(&c, weights), c.valid, c.ranges))
                })
                .collect();
            reporter.report(Progress::TaskIncrement {
                amount: chunk.len() as u64,
            });
            out
        };

        #[cfg(not(feature = "parallel"))]
        let chunks = placements.chunks(CHUNK_SIZE);

        #[cfg(feature = "parallel")]
        let chunks = placements.par_chunks(CHUNK_SIZE);

        let results = chunks
            .map(score_chunk)
            .collect::<Result<Vec<_>, ScoreError>>()?;

        let mut evaluation = Evaluation::with_capacity(placements.len());
        for (score, valid, ranges) in results.into_iter().flatten() {
            evaluation.push(score, valid, &ranges);
        }
        Ok(evaluation)
    }
}
