use nalgebra::{Isometry3, Matrix3, Rotation3, Translation3, Unit, UnitQuaternion, Vector3};

/// A single-precision rigid transform (rotation + translation).
pub type Xform = Isometry3<f32>;

/// Row-major 4×4 homogeneous matrix, the persisted form of an [`Xform`].
pub type XformMatrix = [[f32; 4]; 4];

const ORTHONORMAL_TOLERANCE: f32 = 1e-4;

pub fn identity() -> Xform {
    Xform::identity()
}

pub fn rotation_about_z(angle_degrees: f32) -> Xform {
    Xform::from_parts(
        Translation3::identity(),
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle_degrees.to_radians()),
    )
}

pub fn rotation_about_axis(axis: &Vector3<f32>, angle_degrees: f32) -> Xform {
    Xform::from_parts(
        Translation3::identity(),
        UnitQuaternion::from_axis_angle(&Unit::new_normalize(*axis), angle_degrees.to_radians()),
    )
}

pub fn to_matrix(xform: &Xform) -> XformMatrix {
    let m = xform.to_homogeneous();
    let mut out = [[0.0; 4]; 4];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, value) in row.iter_mut().enumerate() {
            *value = m[(r, c)];
        }
    }
    out
}

/// Rebuilds a rigid transform from a homogeneous matrix.
///
/// Returns `None` unless the rotation block is orthonormal with determinant +1 and the last row
/// is `[0, 0, 0, 1]`.
pub fn from_matrix(m: &XformMatrix) -> Option<Xform> {
    if m[3] != [0.0, 0.0, 0.0, 1.0] {
        return None;
    }
    let rot = Matrix3::new(
        m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
    );
    let gram = rot.transpose() * rot;
    if (gram - Matrix3::identity()).abs().max() > ORTHONORMAL_TOLERANCE
        || (rot.determinant() - 1.0).abs() > ORTHONORMAL_TOLERANCE
    {
        return None;
    }
    let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rot));
    Some(Xform::from_parts(
        Translation3::new(m[0][3], m[1][3], m[2][3]),
        rotation,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn rotation_about_z_maps_x_to_y_at_ninety_degrees() {
        let x = rotation_about_z(90.0);
        let p = x * Point3::new(1.0, 0.0, 0.0);
        assert!((p - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn matrix_export_places_translation_in_last_column() {
        let x = Xform::from_parts(Translation3::new(1.0, 2.0, 3.0), UnitQuaternion::identity());
        let m = to_matrix(&x);
        assert_eq!([m[0][3], m[1][3], m[2][3]], [1.0, 2.0, 3.0]);
        assert_eq!(m[3], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn from_matrix_recovers_rigid_transform() {
        let x = rotation_about_axis(&Vector3::new(1.0, 1.0, 0.0), 37.0)
            * Xform::translation(4.0, -1.0, 2.5);
        let back = from_matrix(&to_matrix(&x)).unwrap();
        let p = Point3::new(0.3, -2.0, 5.0);
        assert!(((x * p) - (back * p)).norm() < 1e-4);
    }

    #[test]
    fn from_matrix_rejects_scaled_rotation() {
        let mut m = to_matrix(&identity());
        m[0][0] = 2.0;
        assert!(from_matrix(&m).is_none());
    }

    #[test]
    fn from_matrix_rejects_reflection() {
        let mut m = to_matrix(&identity());
        m[2][2] = -1.0;
        assert!(from_matrix(&m).is_none());
    }
}
