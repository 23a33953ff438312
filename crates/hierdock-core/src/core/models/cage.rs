use super::xform::Xform;
use nalgebra::{Translation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Two rotations closer than this (radians) are the same group element.
const SAME_ELEMENT: f32 = 1e-3;

const GOLDEN: f32 = 1.618_034;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CageError {
    #[error(
        "Unsupported cage architecture '{0}'. Expected a group letter T, O or I followed by the \
         fold of each component, e.g. 'T33', 'I53' or 'O432'."
    )]
    Unsupported(String),
}

/// The rotational point groups of closed cages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointGroup {
    T,
    O,
    I,
}

impl PointGroup {
    pub fn order(self) -> usize {
        match self {
            Self::T => 12,
            Self::O => 24,
            Self::I => 60,
        }
    }

    /// Symmetry axes of each fold, in the order components claim them.
    fn axes(self, nfold: u32) -> Vec<Vector3<f32>> {
        match (self, nfold) {
            (Self::T, 2) => vec![Vector3::z()],
            (Self::T, 3) => vec![Vector3::new(1.0, 1.0, 1.0), Vector3::new(1.0, 1.0, -1.0)],
            (Self::O, 2) => vec![Vector3::new(1.0, 1.0, 0.0)],
            (Self::O, 3) => vec![Vector3::new(1.0, 1.0, 1.0)],
            (Self::O, 4) => vec![Vector3::z()],
            (Self::I, 2) => vec![Vector3::z()],
            (Self::I, 3) => vec![Vector3::new(1.0, 1.0, 1.0)],
            (Self::I, 5) => vec![Vector3::new(0.0, 1.0, GOLDEN)],
            _ => Vec::new(),
        }
        .into_iter()
        .map(|a| a.normalize())
        .collect()
    }

    fn generators(self) -> Vec<UnitQuaternion<f32>> {
        let about = |axis: Vector3<f32>, nfold: u32| {
            UnitQuaternion::from_axis_angle(&Unit::new_normalize(axis), 2.0 * PI / nfold as f32)
        };
        let c3 = about(Vector3::new(1.0, 1.0, 1.0), 3);
        match self {
            Self::T => vec![c3, about(Vector3::z(), 2)],
            Self::O => vec![about(Vector3::z(), 4), c3],
            Self::I => vec![about(Vector3::new(0.0, 1.0, GOLDEN), 5), c3, about(Vector3::z(), 2)],
        }
    }

    /// Every rotation of the group, starting with the identity.
    pub fn elements(self) -> Vec<Xform> {
        let generators = self.generators();
        let mut found = vec![UnitQuaternion::identity()];
        let mut next = 0;
        while next < found.len() && found.len() < self.order() {
            let q = found[next];
            for g in &generators {
                let product = UnitQuaternion::new_normalize(*(g * q).quaternion());
                if !found.iter().any(|f| f.angle_to(&product) < SAME_ELEMENT) {
                    found.push(product);
                }
            }
            next += 1;
        }
        found
            .into_iter()
            .map(|q| Xform::from_parts(Translation3::identity(), q))
            .collect()
    }
}

impl fmt::Display for PointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::T => "T",
            Self::O => "O",
            Self::I => "I",
        };
        f.write_str(s)
    }
}

/// A multi-component cage: a point group and the cyclic fold of each component.
///
/// Components are cyclic oligomers whose axes coincide with symmetry axes of the group. Each
/// component claims the first free axis of its fold; only `T33` has two axes of the same fold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CageArch {
    group: PointGroup,
    nfolds: Vec<u32>,
}

impl CageArch {
    pub fn group(&self) -> PointGroup {
        self.group
    }

    pub fn ncomponents(&self) -> usize {
        self.nfolds.len()
    }

    pub fn nfolds(&self) -> &[u32] {
        &self.nfolds
    }

    /// Unit axis of every component, in component order.
    pub fn axes(&self) -> Vec<Vector3<f32>> {
        let mut claimed: Vec<u32> = Vec::new();
        self.nfolds
            .iter()
            .map(|&n| {
                let rank = claimed.iter().filter(|&&c| c == n).count();
                claimed.push(n);
                self.group.axes(n)[rank]
            })
            .collect()
    }

    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl FromStr for CageArch {
    type Err = CageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || CageError::Unsupported(s.to_string());
        let trimmed = s.trim().to_ascii_uppercase();
        let mut chars = trimmed.chars();
        let group = match chars.next() {
            Some('T') => PointGroup::T,
            Some('O') => PointGroup::O,
            Some('I') => PointGroup::I,
            _ => return Err(unsupported()),
        };
        let nfolds = chars
            .map(|c| c.to_digit(10).ok_or_else(unsupported))
            .collect::<Result<Vec<_>, _>>()?;
        if !(2..=3).contains(&nfolds.len()) {
            return Err(unsupported());
        }
        for (k, &n) in nfolds.iter().enumerate() {
            let rank = nfolds[..k].iter().filter(|&&m| m == n).count();
            if rank >= group.axes(n).len() {
                return Err(unsupported());
            }
        }
        Ok(Self { group, nfolds })
    }
}

impl TryFrom<String> for CageArch {
    type Error = CageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CageArch> for String {
    fn from(arch: CageArch) -> Self {
        arch.to_string()
    }
}

impl fmt::Display for CageArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.group)?;
        for n in &self.nfolds {
            write!(f, "{n}")?;
        }
        Ok(())
    }
}

/// Indices of the `elements` that do not map `axis` onto itself.
pub fn off_axis_elements(elements: &[Xform], axis: &Vector3<f32>) -> Vec<usize> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, g)| (g.rotation * axis - axis).norm() > SAME_ELEMENT)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::xform::rotation_about_axis;

    fn contains(elements: &[Xform], x: &Xform) -> bool {
        elements
            .iter()
            .any(|g| g.rotation.angle_to(&x.rotation) < 1e-3)
    }

    #[test]
    fn groups_have_their_order_and_are_closed() {
        for group in [PointGroup::T, PointGroup::O, PointGroup::I] {
            let elements = group.elements();
            assert_eq!(elements.len(), group.order(), "{group}");
            assert_eq!(elements[0], Xform::identity());
            for a in elements.iter().step_by(3) {
                for b in &elements {
                    assert!(contains(&elements, &(a * b)), "{group} is not closed");
                }
            }
        }
    }

    #[test]
    fn component_axes_are_symmetry_axes_of_their_fold() {
        for name in ["T32", "T33", "O32", "O42", "O43", "I32", "I52", "I53", "O432", "I532"] {
            let arch: CageArch = name.parse().unwrap();
            let elements = arch.group().elements();
            for (axis, &n) in arch.axes().iter().zip(arch.nfolds()) {
                assert!((axis.norm() - 1.0).abs() < 1e-5);
                let step = rotation_about_axis(axis, 360.0 / n as f32);
                assert!(contains(&elements, &step), "{name}: {n}-fold axis {axis:?}");
                let stabilizer = elements.len() - off_axis_elements(&elements, axis).len();
                assert_eq!(stabilizer, n as usize, "{name}");
            }
        }
    }

    #[test]
    fn t33_uses_two_distinct_three_fold_axes() {
        let arch: CageArch = "T33".parse().unwrap();
        let axes = arch.axes();
        assert_eq!(arch.ncomponents(), 2);
        assert!((axes[0] - axes[1]).norm() > 0.5);
    }

    #[test]
    fn architecture_names_round_trip_and_reject_unknown_folds() {
        let arch: CageArch = "i53".parse().unwrap();
        assert_eq!(arch.name(), "I53");
        assert_eq!(arch.group(), PointGroup::I);
        assert_eq!(arch.nfolds(), &[5, 3]);
        for bad in ["", "T", "T3", "T44", "O33", "I55", "X32", "I5322", "C3", "O4x"] {
            assert_eq!(
                bad.parse::<CageArch>(),
                Err(CageError::Unsupported(bad.to_string())),
                "{bad}"
            );
        }
    }
}
