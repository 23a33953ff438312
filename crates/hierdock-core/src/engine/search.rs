use super::batch::CandidateBatch;
use super::config::SearchConfig;
use super::error::EngineError;
use super::evaluators::Evaluator;
use super::progress::{Progress, ProgressReporter};
use crate::core::sampling::{Hierarchy, HierarchyError};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelStats {
    pub level: usize,
    pub seconds: f64,
    pub n_evaluated: usize,
    pub n_valid: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchStats {
    pub levels: Vec<LevelStats>,
}

impl SearchStats {
    pub fn total_evaluated(&self) -> usize {
        self.levels.iter().map(|l| l.n_evaluated).sum()
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome<P> {
    /// Valid candidates of the last level run, best first.
    pub batch: CandidateBatch<P>,
    pub stats: SearchStats,
}

/// Number of cells kept for expansion after each non-final level of a sampler whose cells have
/// `nchild` children.
pub fn expansion_count(beam_size: usize, nchild: u64) -> usize {
    (beam_size / nchild as usize).max(1)
}

/// Coarse-to-fine beam search over `nresl` levels of `sampler`.
///
/// Level 0 is evaluated exhaustively. After each level the valid candidates are ranked by
/// descending score (ties keep cell order), the best `beam_size / nchild` are expanded into
/// their children, and the children form the next level's candidates. An empty survivor set
/// ends the search early with an empty outcome.
#[instrument(skip_all, name = "hier_search_task")]
pub fn hier_search<H, E>(
    sampler: &H,
    evaluator: &E,
    config: &SearchConfig,
    nresl: usize,
    reporter: &ProgressReporter,
) -> Result<SearchOutcome<H::Placement>, EngineError>
where
    H: Hierarchy,
    E: Evaluator<Placement = H::Placement>,
{
    if !sampler.sanity_check() {
        return Err(HierarchyError::SanityCheck("sampler failed validation".into()).into());
    }
    if nresl == 0 || nresl > sampler.depth() {
        return Err(HierarchyError::LevelOutOfRange {
            level: nresl.saturating_sub(1),
            depth: sampler.depth(),
        }
        .into());
    }

    let nexpand = expansion_count(config.beam_size, sampler.nchild());
    let mut stats = SearchStats::default();
    let mut indices: Vec<u64> = (0..sampler.size(0)?).collect();
    info!(
        nresl,
        beam_size = config.beam_size,
        nchild = sampler.nchild(),
        level0 = indices.len(),
        "Starting hierarchical search."
    );

    for level in 0..nresl {
        let started = Instant::now();
        reporter.report(Progress::PhaseStart {
            name: format!("Level {}/{}", level + 1, nresl),
        });

        let placements = sampler.cell_to_placements(level, &indices)?;
        reporter.report(Progress::TaskStart {
            total_steps: placements.len() as u64,
        });
        let evaluation = evaluator.evaluate(&placements, level, &config.weights, reporter)?;
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);

        let batch = CandidateBatch::from_evaluation(indices, placements, evaluation)?;
        let ranked = batch.ranked();
        stats.levels.push(LevelStats {
            level,
            seconds: started.elapsed().as_secs_f64(),
            n_evaluated: batch.len(),
            n_valid: ranked.len(),
        });
        debug!(
            level,
            evaluated = batch.len(),
            valid = ranked.len(),
            best = ranked.first().map(|&i| batch.scores()[i]),
            "Level evaluated."
        );

        if level + 1 == nresl {
            return Ok(SearchOutcome {
                batch: batch.select(&ranked),
                stats,
            });
        }
        if ranked.is_empty() {
            info!(level, "No valid candidates left; stopping early.");
            return Ok(SearchOutcome {
                batch: CandidateBatch::default(),
                stats,
            });
        }

        let parents: Vec<u64> = ranked
            .iter()
            .take(nexpand)
            .map(|&i| batch.indices()[i])
            .collect();
        indices = sampler.expand(level, &parents)?;
    }

    Err(EngineError::Internal(
        "search loop ended without reaching the final level".into(),
    ))
}
