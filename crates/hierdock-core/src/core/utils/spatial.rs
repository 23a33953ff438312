use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;
use std::fmt;
use std::sync::Arc;

/// Leaf capacity of the kd-tree. A leaf cannot split when more points than this share one
/// coordinate value, so such point sets are scanned linearly instead.
const BUCKET_SIZE: usize = 32;

#[derive(Clone)]
enum Backend {
    Tree(Arc<KdTree<f32, 3>>),
    Linear(Arc<[[f32; 3]]>),
}

/// An immutable point set answering nearest-neighbour and radius queries.
///
/// Items are the positions of the points in the slice the index was built from. Clones share
/// the underlying tree.
#[derive(Clone)]
pub struct PointIndex {
    backend: Backend,
    len: usize,
}

impl PointIndex {
    pub fn new(points: &[Point3<f32>]) -> Self {
        let coords: Vec<[f32; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
        let len = coords.len();
        let backend = if coords.is_empty() || has_crowded_axis(&coords) {
            Backend::Linear(coords.into())
        } else {
            let tree: KdTree<f32, 3> = (&coords).into();
            Backend::Tree(Arc::new(tree))
        };
        Self { backend, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Squared distance from `query` to the closest point, `None` for an empty index.
    pub fn nearest_dist2(&self, query: &Point3<f32>) -> Option<f32> {
        let q = [query.x, query.y, query.z];
        match &self.backend {
            Backend::Tree(tree) => Some(tree.nearest_one::<SquaredEuclidean>(&q).distance),
            Backend::Linear(points) => points.iter().map(|p| dist2(p, &q)).min_by(f32::total_cmp),
        }
    }

    /// `true` when some point lies strictly closer than `radius` to `query`.
    pub fn any_within(&self, query: &Point3<f32>, radius: f32) -> bool {
        self.nearest_dist2(query)
            .is_some_and(|d2| d2 < radius * radius)
    }

    /// `(item, squared distance)` of every point strictly closer than `radius` to `query`,
    /// in item order.
    pub fn within(&self, query: &Point3<f32>, radius: f32) -> Vec<(usize, f32)> {
        let q = [query.x, query.y, query.z];
        let r2 = radius * radius;
        let mut found: Vec<(usize, f32)> = match &self.backend {
            Backend::Tree(tree) => tree
                .within_unsorted::<SquaredEuclidean>(&q, r2)
                .into_iter()
                .filter(|n| n.distance < r2)
                .map(|n| (n.item as usize, n.distance))
                .collect(),
            Backend::Linear(points) => points
                .iter()
                .enumerate()
                .filter_map(|(i, p)| {
                    let d2 = dist2(p, &q);
                    (d2 < r2).then_some((i, d2))
                })
                .collect(),
        };
        found.sort_unstable_by_key(|&(i, _)| i);
        found
    }
}

impl fmt::Debug for PointIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = match self.backend {
            Backend::Tree(_) => "kd-tree",
            Backend::Linear(_) => "linear",
        };
        f.debug_struct("PointIndex")
            .field("len", &self.len)
            .field("backend", &backend)
            .finish()
    }
}

#[inline]
fn dist2(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

/// Whether at least `BUCKET_SIZE` points share a coordinate value on some axis.
fn has_crowded_axis(coords: &[[f32; 3]]) -> bool {
    (0..3).any(|axis| {
        let mut values: Vec<f32> = coords.iter().map(|c| c[axis]).collect();
        values.sort_unstable_by(f32::total_cmp);
        values
            .chunk_by(|a, b| a == b)
            .any(|run| run.len() >= BUCKET_SIZE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_points(rng: &mut StdRng, n: usize, extent: f32) -> Vec<Point3<f32>> {
        (0..n)
            .map(|_| {
                Point3::new(
                    rng.gen_range(-extent..extent),
                    rng.gen_range(-extent..extent),
                    rng.gen_range(-extent..extent),
                )
            })
            .collect()
    }

    fn brute_within(points: &[Point3<f32>], q: &Point3<f32>, radius: f32) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| (*p - q).norm_squared() < radius * radius)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn scattered_points_build_a_tree() {
        let mut rng = StdRng::seed_from_u64(1);
        let index = PointIndex::new(&random_points(&mut rng, 500, 20.0));
        assert!(matches!(index.backend, Backend::Tree(_)));
        assert_eq!(index.len(), 500);
    }

    #[test]
    fn radius_queries_match_exhaustive_scan() {
        let mut rng = StdRng::seed_from_u64(7);
        let points = random_points(&mut rng, 2000, 25.0);
        let index = PointIndex::new(&points);
        for q in random_points(&mut rng, 200, 30.0) {
            let found: Vec<usize> = index.within(&q, 4.0).iter().map(|&(i, _)| i).collect();
            assert_eq!(found, brute_within(&points, &q, 4.0));
            assert_eq!(index.any_within(&q, 4.0), !found.is_empty());
        }
    }

    #[test]
    fn nearest_distance_matches_exhaustive_scan() {
        let mut rng = StdRng::seed_from_u64(3);
        let points = random_points(&mut rng, 300, 10.0);
        let index = PointIndex::new(&points);
        for q in random_points(&mut rng, 50, 15.0) {
            let expected = points
                .iter()
                .map(|p| (p - q).norm_squared())
                .fold(f32::INFINITY, f32::min);
            let got = index.nearest_dist2(&q).unwrap();
            assert!((got - expected).abs() <= 1e-3 * expected.max(1.0));
        }
    }

    #[test]
    fn collinear_points_fall_back_to_scanning() {
        let points: Vec<Point3<f32>> = (0..100)
            .map(|i| Point3::new(3.8 * i as f32, 0.0, 0.0))
            .collect();
        let index = PointIndex::new(&points);
        assert!(matches!(index.backend, Backend::Linear(_)));
        let found = index.within(&Point3::new(38.0, 1.0, 0.0), 3.0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 10);
        assert!((found[0].1 - 1.0).abs() < 1e-4);
    }

    #[test]
    fn radius_is_exclusive_and_empty_index_finds_nothing() {
        let index = PointIndex::new(&[Point3::new(0.0, 0.0, 0.0)]);
        assert!(!index.any_within(&Point3::new(2.0, 0.0, 0.0), 2.0));
        assert!(index.any_within(&Point3::new(1.9, 0.0, 0.0), 2.0));

        let empty = PointIndex::new(&[]);
        assert!(empty.is_empty());
        assert_eq!(empty.nearest_dist2(&Point3::origin()), None);
        assert!(empty.within(&Point3::origin(), 100.0).is_empty());
    }
}
