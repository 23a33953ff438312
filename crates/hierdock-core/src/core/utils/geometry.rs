use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};

pub fn centroid(points: &[Point3<f32>]) -> Option<Point3<f32>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f32))
}

/// Principal axes of a point cloud about `center`, ordered by decreasing variance.
///
/// Each axis is a unit vector. A degenerate cloud (one point, or all points collinear) still
/// yields an orthonormal frame because the covariance is symmetric.
pub fn principal_axes(points: &[Point3<f32>], center: &Point3<f32>) -> [Vector3<f32>; 3] {
    let mut cov = Matrix3::<f32>::zeros();
    for p in points {
        let d = p - center;
        cov += d * d.transpose();
    }
    if !points.is_empty() {
        cov /= points.len() as f32;
    }

    let eigen = SymmetricEigen::new(cov);
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    order.map(|i| {
        let v: Vector3<f32> = eigen.eigenvectors.column(i).into_owned();
        v.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::x)
    })
}

pub fn max_distance(points: &[Point3<f32>], center: &Point3<f32>) -> f32 {
    points
        .iter()
        .map(|p| (p - center).norm())
        .fold(0.0, f32::max)
}

/// Radius of gyration of `points` about the z axis (xy components only).
pub fn radius_of_gyration_xy(points: &[Point3<f32>]) -> f32 {
    if points.is_empty() {
        return 0.0;
    }
    let sum: f32 = points.iter().map(|p| p.x * p.x + p.y * p.y).sum();
    (sum / points.len() as f32).sqrt()
}

/// Root-mean-square z coordinate of `points`.
pub fn radius_of_gyration_z(points: &[Point3<f32>]) -> f32 {
    if points.is_empty() {
        return 0.0;
    }
    let sum: f32 = points.iter().map(|p| p.z * p.z).sum();
    (sum / points.len() as f32).sqrt()
}

/// Root-mean-square distance between corresponding points of two equally long sets.
pub fn rms_deviation(a: &[Point3<f32>], b: &[Point3<f32>]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }
    let sum: f32 = a
        .iter()
        .zip(b)
        .map(|(p, q)| (p - q).norm_squared())
        .sum();
    (sum / a.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn centroid_of_empty_set_is_none() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn principal_axis_follows_elongation() {
        let points: Vec<_> = (-5..=5)
            .map(|i| Point3::new(0.1 * (i % 2) as f32, 0.0, i as f32))
            .collect();
        let center = centroid(&points).unwrap();
        let axes = principal_axes(&points, &center);
        assert!(axes[0].z.abs() > 0.99);
        for a in &axes {
            assert!(approx(a.norm(), 1.0));
        }
        assert!(axes[0].dot(&axes[1]).abs() < 1e-4);
    }

    #[test]
    fn radii_of_gyration_split_xy_and_z() {
        let points = [Point3::new(3.0, 4.0, 1.0), Point3::new(-3.0, -4.0, -1.0)];
        assert!(approx(radius_of_gyration_xy(&points), 5.0));
        assert!(approx(radius_of_gyration_z(&points), 1.0));
        assert!(approx(max_distance(&points, &Point3::origin()), 26f32.sqrt()));
    }

    #[test]
    fn rms_deviation_of_uniform_shift_is_shift_length() {
        let a = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0)];
        let b = a.map(|p| p + Vector3::new(0.0, 3.0, 4.0));
        assert!(approx(rms_deviation(&a, &b), 5.0));
    }
}
