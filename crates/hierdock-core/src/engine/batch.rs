use super::error::EngineError;
use crate::core::models::body::ResidueRange;
use crate::core::models::xform::Xform;

/// Per-candidate outcome of one evaluation pass, index-aligned with the evaluated placements.
///
/// Candidate `i` keeps `nbody` residue ranges at `res_lb[i * nbody..]` and `res_ub[i * nbody..]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub scores: Vec<f32>,
    pub valid: Vec<bool>,
    pub nbody: usize,
    pub res_lb: Vec<usize>,
    pub res_ub: Vec<usize>,
}

impl Evaluation {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            scores: Vec::with_capacity(n),
            valid: Vec::with_capacity(n),
            nbody: 0,
            res_lb: Vec::with_capacity(n),
            res_ub: Vec::with_capacity(n),
        }
    }

    /// Appends one candidate. The first push fixes `nbody`.
    pub fn push(&mut self, score: f32, valid: bool, ranges: &[ResidueRange]) {
        if self.scores.is_empty() {
            self.nbody = ranges.len();
        }
        self.scores.push(score);
        self.valid.push(valid);
        self.res_lb.extend(ranges.iter().map(|r| r.lb));
        self.res_ub.extend(ranges.iter().map(|r| r.ub));
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Structure-of-arrays view of the candidates at one level.
///
/// Position `i` of every per-candidate array describes the same candidate, and the residue
/// bounds hold `nbody` entries per candidate. Construction fails unless every length agrees.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateBatch<P = Xform> {
    indices: Vec<u64>,
    placements: Vec<P>,
    valid: Vec<bool>,
    scores: Vec<f32>,
    nbody: usize,
    res_lb: Vec<usize>,
    res_ub: Vec<usize>,
}

impl<P> Default for CandidateBatch<P> {
    fn default() -> Self {
        Self {
            indices: Vec::new(),
            placements: Vec::new(),
            valid: Vec::new(),
            scores: Vec::new(),
            nbody: 0,
            res_lb: Vec::new(),
            res_ub: Vec::new(),
        }
    }
}

impl<P: Clone> CandidateBatch<P> {
    pub fn new(
        indices: Vec<u64>,
        placements: Vec<P>,
        valid: Vec<bool>,
        scores: Vec<f32>,
        nbody: usize,
        res_lb: Vec<usize>,
        res_ub: Vec<usize>,
    ) -> Result<Self, EngineError> {
        let expected = indices.len();
        let nbounds = expected * nbody;
        for (field, expected, found) in [
            ("placements", expected, placements.len()),
            ("valid", expected, valid.len()),
            ("scores", expected, scores.len()),
            ("res_lb", nbounds, res_lb.len()),
            ("res_ub", nbounds, res_ub.len()),
        ] {
            if found != expected {
                return Err(EngineError::BatchLength {
                    field,
                    expected,
                    found,
                });
            }
        }
        Ok(Self {
            indices,
            placements,
            valid,
            scores,
            nbody,
            res_lb,
            res_ub,
        })
    }

    pub fn from_evaluation(
        indices: Vec<u64>,
        placements: Vec<P>,
        evaluation: Evaluation,
    ) -> Result<Self, EngineError> {
        Self::new(
            indices,
            placements,
            evaluation.valid,
            evaluation.scores,
            evaluation.nbody,
            evaluation.res_lb,
            evaluation.res_ub,
        )
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[u64] {
        &self.indices
    }

    pub fn placements(&self) -> &[P] {
        &self.placements
    }

    pub fn valid(&self) -> &[bool] {
        &self.valid
    }

    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Moving bodies per candidate.
    pub fn nbody(&self) -> usize {
        self.nbody
    }

    /// Kept residues of each moving body of candidate `i`.
    pub fn ranges(&self, i: usize) -> Vec<ResidueRange> {
        let span = i * self.nbody..(i + 1) * self.nbody;
        self.res_lb[span.clone()]
            .iter()
            .zip(&self.res_ub[span])
            .map(|(&lb, &ub)| ResidueRange::new(lb, ub))
            .collect()
    }

    pub fn n_valid(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    /// Positions of the valid candidates, best score first. Equal scores keep batch order.
    pub fn ranked(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len()).filter(|&i| self.valid[i]).collect();
        order.sort_by(|&a, &b| self.scores[b].total_cmp(&self.scores[a]));
        order
    }

    /// A new batch holding the candidates at `positions`, in that order.
    pub fn select(&self, positions: &[usize]) -> Self {
        let bounds = |field: &[usize]| -> Vec<usize> {
            positions
                .iter()
                .flat_map(|&i| field[i * self.nbody..(i + 1) * self.nbody].iter().copied())
                .collect()
        };
        Self {
            indices: positions.iter().map(|&i| self.indices[i]).collect(),
            placements: positions.iter().map(|&i| self.placements[i].clone()).collect(),
            valid: positions.iter().map(|&i| self.valid[i]).collect(),
            scores: positions.iter().map(|&i| self.scores[i]).collect(),
            nbody: self.nbody,
            res_lb: bounds(&self.res_lb),
            res_ub: bounds(&self.res_ub),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(scores: &[f32], valid: &[bool]) -> CandidateBatch {
        let n = scores.len();
        CandidateBatch::new(
            (0..n as u64).collect(),
            vec![Xform::identity(); n],
            valid.to_vec(),
            scores.to_vec(),
            1,
            vec![0; n],
            vec![9; n],
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_mismatched_lengths() {
        let err = CandidateBatch::new(
            vec![0, 1],
            vec![Xform::identity(); 2],
            vec![true; 2],
            vec![1.0],
            1,
            vec![0; 2],
            vec![0; 2],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::BatchLength {
                field: "scores",
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn residue_bounds_hold_one_entry_per_body() {
        let err = CandidateBatch::new(
            vec![0, 1],
            vec![vec![Xform::identity(); 2]; 2],
            vec![true; 2],
            vec![1.0, 2.0],
            2,
            vec![0; 4],
            vec![5; 3],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::BatchLength {
                field: "res_ub",
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn ranked_orders_valid_candidates_by_descending_score() {
        let b = batch(&[1.0, 5.0, 3.0, 9.0], &[true, true, true, false]);
        assert_eq!(b.ranked(), vec![1, 2, 0]);
        assert_eq!(b.n_valid(), 3);
    }

    #[test]
    fn ranked_breaks_ties_by_batch_order() {
        let b = batch(&[2.0, 4.0, 2.0, 4.0, 2.0], &[true; 5]);
        assert_eq!(b.ranked(), vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn select_keeps_fields_aligned() {
        let b = batch(&[1.0, 5.0, 3.0], &[true; 3]);
        let s = b.select(&[2, 0]);
        assert_eq!(s.indices(), &[2, 0]);
        assert_eq!(s.scores(), &[3.0, 1.0]);
        assert_eq!(s.ranges(1), vec![ResidueRange::new(0, 9)]);
    }

    #[test]
    fn select_moves_every_body_range_of_a_candidate() {
        let mut eval = Evaluation::with_capacity(3);
        for i in 0..3 {
            let r = [ResidueRange::new(i, 10), ResidueRange::new(0, 20 - i)];
            eval.push(i as f32, true, &r);
        }
        assert_eq!(eval.nbody, 2);
        let placements = vec![vec![Xform::identity(); 2]; 3];
        let b = CandidateBatch::from_evaluation(vec![7, 8, 9], placements, eval).unwrap();
        let s = b.select(&b.ranked());
        assert_eq!(s.indices(), &[9, 8, 7]);
        assert_eq!(
            s.ranges(0),
            vec![ResidueRange::new(2, 10), ResidueRange::new(0, 18)]
        );
        assert_eq!(
            s.ranges(2),
            vec![ResidueRange::new(0, 10), ResidueRange::new(0, 20)]
        );
    }
}
