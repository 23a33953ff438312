use super::error::EngineError;
use crate::core::models::body::Body;
use crate::core::models::xform::Xform;
use crate::core::utils::geometry::rms_deviation;
use nalgebra::Point3;
use tracing::{debug, instrument};

/// Every `REDUNDANCY_STRIDE`-th residue centroid takes part in the placement distance.
pub const REDUNDANCY_STRIDE: usize = 10;

/// Every `REDUNDANCY_STRIDE`-th residue centroid of `body` placed at `xform`.
pub(crate) fn strided_points<B: Body>(body: &B, xform: &Xform) -> Vec<Point3<f32>> {
    body.residue_centroids()
        .iter()
        .step_by(REDUNDANCY_STRIDE)
        .map(|p| xform * p)
        .collect()
}

/// RMS deviation between the strided residue centroids of `body` placed at `a` and at `b`.
pub fn placement_distance<B: Body>(body: &B, a: &Xform, b: &Xform) -> f32 {
    rms_deviation(&strided_points(body, a), &strided_points(body, b))
}

/// Greedy dominant-set selection.
///
/// Candidates are visited best score first (ties keep input order); one is accepted when the
/// RMS deviation between its `points` and those of every previously accepted candidate exceeds
/// `max_bb_redundancy`. Selection stops once `max_cluster` are accepted (0 means no cap).
/// Returns indices into `placements`, best first.
#[instrument(skip_all, name = "redundancy_filter")]
pub fn filter_redundancy<P, F>(
    placements: &[P],
    scores: &[f32],
    points: F,
    max_bb_redundancy: f32,
    max_cluster: usize,
) -> Result<Vec<usize>, EngineError>
where
    F: Fn(&P) -> Vec<Point3<f32>>,
{
    if scores.len() != placements.len() {
        return Err(EngineError::BatchLength {
            field: "scores",
            expected: placements.len(),
            found: scores.len(),
        });
    }

    let mut order: Vec<usize> = (0..placements.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut accepted: Vec<usize> = Vec::new();
    let mut accepted_points: Vec<Vec<Point3<f32>>> = Vec::new();
    for i in order {
        if max_cluster > 0 && accepted.len() >= max_cluster {
            break;
        }
        let candidate = points(&placements[i]);
        let distinct = accepted_points
            .iter()
            .all(|kept| rms_deviation(&candidate, kept) > max_bb_redundancy);
        if distinct {
            accepted.push(i);
            accepted_points.push(candidate);
        }
    }

    debug!(
        candidates = placements.len(),
        accepted = accepted.len(),
        max_bb_redundancy,
        "Redundancy filter done."
    );
    Ok(accepted)
}
