use super::result::{InterfaceScore, ResidueBounds};
use crate::core::io::traits::StructureDumper;
use crate::core::models::body::{Body, ResidueRange};
use crate::core::models::xform::Xform;
use crate::core::scoring::table::ScoreError;
use crate::core::scoring::weights::{WeightKey, Weights};
use crate::engine::evaluators::Evaluator;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Per-interface `rpx` and `ncontact` parts of one placement at `level`, plus the kept residues
/// of each moving body.
pub(crate) fn breakdown<E: Evaluator>(
    evaluator: &E,
    placement: &E::Placement,
    level: usize,
    weights: &Weights,
) -> Result<(Vec<InterfaceScore>, Vec<ResidueRange>), ScoreError> {
    let wrpx = weights.with(WeightKey::Ncontact, 0.0);
    let wnct = weights.with(WeightKey::Rpx, 0.0);
    let rpx = evaluator.interface_scores(placement, level, &wrpx)?;
    let ncontact = evaluator.interface_scores(placement, level, &wnct)?;
    let ifaces = evaluator
        .interface_labels()
        .iter()
        .zip(rpx.ifaces.iter().zip(&ncontact.ifaces))
        .map(|(label, (&r, &n))| InterfaceScore::new(label, r, n))
        .collect();
    Ok((ifaces, rpx.ranges))
}

pub(crate) fn dump_path(prefix: &str, rank: usize) -> PathBuf {
    PathBuf::from(format!("{prefix}_{rank:02}.pdb"))
}

/// One structure file to write: the moved working bodies, their symmetry frames and bounds.
pub(crate) struct DumpRequest<B> {
    pub rank: usize,
    pub score: f32,
    pub bodies: Vec<B>,
    pub frames: Vec<Vec<Xform>>,
    pub bounds: Vec<ResidueRange>,
}

/// Writes every request, logging failures instead of propagating them. Returns the time spent.
pub(crate) fn dump_models<B: Body>(
    dumper: &dyn StructureDumper<B>,
    prefix: &str,
    requests: Vec<DumpRequest<B>>,
) -> f64 {
    let started = Instant::now();
    for request in requests {
        let path = dump_path(prefix, request.rank);
        let bodies: Vec<&B> = request.bodies.iter().collect();
        match dumper.dump(&path, &bodies, &request.frames, &request.bounds) {
            Ok(()) => info!(
                file = %path.display(),
                score = request.score,
                "Wrote model."
            ),
            Err(e) => warn!(file = %path.display(), error = %e, "Failed to write model."),
        }
    }
    started.elapsed().as_secs_f64()
}

pub(crate) fn full_bounds<B: Body>(body: &B) -> ResidueBounds {
    ResidueBounds::new(body.label(), ResidueRange::full(body.nres()))
}
