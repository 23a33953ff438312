use super::body::{Body, ResidueRange, TrimDirection, clear_range};
use super::residue::{Residue, SecondaryStructure};
use super::xform::Xform;
use crate::core::utils::geometry;
use crate::core::utils::spatial::PointIndex;
use nalgebra::{Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BodyError {
    #[error("Body '{0}' has no residues")]
    Empty(String),
    #[error("Residue {index} ({name}) of body '{label}' has no atoms")]
    ResidueWithoutAtoms {
        label: String,
        index: usize,
        name: String,
    },
}

/// A rigid protein body: residues with atom coordinates in the body's own frame, plus the
/// geometric summaries the search reads.
#[derive(Debug, Clone)]
pub struct RigidBody {
    label: String,
    residues: Vec<Residue>,
    centroids: Vec<Point3<f32>>,
    ss: Vec<SecondaryStructure>,
    atoms: Vec<Point3<f32>>,
    atom_residue: Vec<usize>,
    atom_index: PointIndex,
    centroid_index: PointIndex,
    center: Point3<f32>,
    bounding_radius: f32,
    pcavecs: [Vector3<f32>; 3],
    rg_xy: f32,
    rg_z: f32,
    position: Xform,
}

impl RigidBody {
    pub fn new(label: &str, residues: Vec<Residue>) -> Result<Self, BodyError> {
        if residues.is_empty() {
            return Err(BodyError::Empty(label.to_string()));
        }

        let mut centroids = Vec::with_capacity(residues.len());
        let mut atoms = Vec::new();
        let mut atom_residue = Vec::new();
        for (index, residue) in residues.iter().enumerate() {
            let c = residue
                .centroid()
                .ok_or_else(|| BodyError::ResidueWithoutAtoms {
                    label: label.to_string(),
                    index,
                    name: residue.name.clone(),
                })?;
            centroids.push(c);
            for atom in &residue.atoms {
                atoms.push(atom.position);
                atom_residue.push(index);
            }
        }

        let center = geometry::centroid(&atoms).unwrap_or_else(Point3::origin);
        let bounding_radius = geometry::max_distance(&atoms, &center);

        Ok(Self {
            label: label.to_string(),
            ss: residues.iter().map(|r| r.ss).collect(),
            atom_index: PointIndex::new(&atoms),
            centroid_index: PointIndex::new(&centroids),
            pcavecs: geometry::principal_axes(&atoms, &center),
            rg_xy: geometry::radius_of_gyration_xy(&atoms),
            rg_z: geometry::radius_of_gyration_z(&atoms),
            residues,
            centroids,
            atoms,
            atom_residue,
            center,
            bounding_radius,
            position: Xform::identity(),
        })
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn center(&self) -> &Point3<f32> {
        &self.center
    }

    /// Atoms of `other` expressed in the frame of `self`, restricted to those that can reach
    /// within `clash_dist` of this body's bounding sphere.
    fn nearby_atoms<'a>(
        &'a self,
        other: &'a Self,
        clash_dist: f32,
        xself: &Xform,
        xother: &Xform,
    ) -> impl Iterator<Item = Point3<f32>> + 'a {
        let rel = xself.inverse() * xother;
        let reach = self.bounding_radius + clash_dist;
        let apart = (rel * other.center - self.center).norm() > reach + other.bounding_radius;
        let reach2 = reach * reach;
        let atoms: &[Point3<f32>] = if apart { &[] } else { &other.atoms };
        atoms
            .iter()
            .map(move |p| rel * p)
            .filter(move |p| (p - self.center).norm_squared() <= reach2)
    }
}

impl Body for RigidBody {
    fn label(&self) -> &str {
        &self.label
    }

    fn nres(&self) -> usize {
        self.residues.len()
    }

    fn residue_centroids(&self) -> &[Point3<f32>] {
        &self.centroids
    }

    fn secondary_structure(&self) -> &[SecondaryStructure] {
        &self.ss
    }

    fn pcavecs(&self) -> &[Vector3<f32>; 3] {
        &self.pcavecs
    }

    fn radius_max(&self) -> f32 {
        self.bounding_radius
    }

    fn rg_xy(&self) -> f32 {
        self.rg_xy
    }

    fn rg_z(&self) -> f32 {
        self.rg_z
    }

    fn clash_ok(&self, other: &Self, clash_dist: f32, xself: &Xform, xother: &Xform) -> bool {
        !self
            .nearby_atoms(other, clash_dist, xself, xother)
            .any(|q| self.atom_index.any_within(&q, clash_dist))
    }

    fn clashing_residues(
        &self,
        other: &Self,
        clash_dist: f32,
        xself: &Xform,
        xother: &Xform,
    ) -> Vec<bool> {
        let mut flags = vec![false; self.nres()];
        for q in self.nearby_atoms(other, clash_dist, xself, xother) {
            for (atom, _) in self.atom_index.within(&q, clash_dist) {
                flags[self.atom_residue[atom]] = true;
            }
        }
        flags
    }

    fn centroids_near(&self, point: &Point3<f32>, radius: f32) -> Vec<(usize, f32)> {
        self.centroid_index.within(point, radius)
    }

    fn intersect_range(
        &self,
        other: &Self,
        clash_dist: f32,
        max_trim: usize,
        direction: TrimDirection,
        xself: &Xform,
        xother: &Xform,
    ) -> Option<ResidueRange> {
        let flags = self.clashing_residues(other, clash_dist, xself, xother);
        clear_range(&flags, max_trim, direction)
    }

    fn move_to(&mut self, xform: &Xform) {
        self.position = *xform;
    }

    fn position(&self) -> &Xform {
        &self.position
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::models::residue::Atom;
    use crate::core::models::xform::rotation_about_z;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// A straight strand of `n` one-atom residues spaced 3.8 Å along x, starting at the origin.
    pub(crate) fn strand(label: &str, n: usize) -> RigidBody {
        let residues = (0..n)
            .map(|i| {
                Residue::new(
                    "ALA",
                    SecondaryStructure::Strand,
                    vec![Atom::new("CA", Point3::new(3.8 * i as f32, 0.0, 0.0))],
                )
            })
            .collect();
        RigidBody::new(label, residues).unwrap()
    }

    #[test]
    fn new_rejects_empty_body_and_atomless_residue() {
        assert_eq!(
            RigidBody::new("x", vec![]).unwrap_err(),
            BodyError::Empty("x".into())
        );
        let err = RigidBody::new(
            "y",
            vec![Residue::new("GLY", SecondaryStructure::Loop, vec![])],
        )
        .unwrap_err();
        assert!(matches!(err, BodyError::ResidueWithoutAtoms { index: 0, .. }));
    }

    #[test]
    fn geometry_summaries_match_a_straight_strand() {
        let body = strand("a", 5);
        assert_eq!(body.nres(), 5);
        assert!((body.center().x - 7.6).abs() < 1e-4);
        assert!((body.radius_max() - 7.6).abs() < 1e-4);
        assert!(body.pcavecs()[0].x.abs() > 0.999);
        assert_eq!(body.rg_z(), 0.0);
    }

    #[test]
    fn clash_ok_depends_on_separation() {
        let a = strand("a", 4);
        let b = strand("b", 4);
        let id = Xform::identity();
        assert!(!a.clash_ok(&b, 3.0, &id, &Xform::translation(0.0, 2.0, 0.0)));
        assert!(a.clash_ok(&b, 3.0, &id, &Xform::translation(0.0, 10.0, 0.0)));
    }

    #[test]
    fn clash_ok_uses_explicit_placements_not_working_position() {
        let mut a = strand("a", 4);
        let b = strand("b", 4);
        a.move_to(&Xform::translation(0.0, 100.0, 0.0));
        let id = Xform::identity();
        assert!(!a.clash_ok(&b, 3.0, &id, &id));
        assert_eq!(a.position(), &Xform::translation(0.0, 100.0, 0.0));
    }

    #[test]
    fn intersect_range_trims_clashing_terminus() {
        let a = strand("a", 10);
        let blocker = strand("b", 1);
        // The single blocker atom sits next to the last residue of `a`.
        let xb = Xform::translation(3.8 * 9.0, 1.0, 0.0);
        let id = Xform::identity();
        assert_eq!(
            a.intersect_range(&blocker, 3.0, 2, TrimDirection::C, &id, &xb),
            Some(ResidueRange::new(0, 8))
        );
        assert_eq!(
            a.intersect_range(&blocker, 3.0, 2, TrimDirection::N, &id, &xb),
            None
        );
        assert_eq!(
            a.intersect_range(&blocker, 3.0, 0, TrimDirection::NC, &id, &xb),
            None
        );
    }

    /// A compact blob of `nres` residues with three atoms each, scattered in a 12 Å cube.
    pub(crate) fn blob(label: &str, nres: usize, seed: u64) -> RigidBody {
        let mut rng = StdRng::seed_from_u64(seed);
        let residues = (0..nres)
            .map(|_| {
                let atoms = (0..3)
                    .map(|_| {
                        let p = Point3::new(
                            rng.gen_range(-6.0..6.0),
                            rng.gen_range(-6.0..6.0),
                            rng.gen_range(-6.0..6.0),
                        );
                        Atom::new("C", p)
                    })
                    .collect();
                Residue::new("ALA", SecondaryStructure::Helix, atoms)
            })
            .collect();
        RigidBody::new(label, residues).unwrap()
    }

    fn exhaustive_flags(
        a: &RigidBody,
        b: &RigidBody,
        d: f32,
        xa: &Xform,
        xb: &Xform,
    ) -> Vec<bool> {
        let mut flags = vec![false; a.nres()];
        for (p, &res) in a.atoms.iter().zip(&a.atom_residue) {
            let pa = xa * p;
            if b.atoms.iter().any(|q| (pa - xb * q).norm_squared() < d * d) {
                flags[res] = true;
            }
        }
        flags
    }

    #[test]
    fn indexed_clash_checks_agree_with_exhaustive_scan() {
        let a = blob("a", 120, 5);
        let b = blob("b", 90, 6);
        let mut rng = StdRng::seed_from_u64(17);
        let mut clashing = 0;
        for _ in 0..60 {
            let xa = rotation_about_z(rng.gen_range(0.0..360.0));
            let shift = Xform::translation(rng.gen_range(4.0..24.0), rng.gen_range(-3.0..3.0), 0.0);
            let xb = rotation_about_z(rng.gen_range(0.0..360.0)) * shift;
            let expected = exhaustive_flags(&a, &b, 2.5, &xa, &xb);
            let got = a.clashing_residues(&b, 2.5, &xa, &xb);
            // Rounding at the cutoff is the only room for disagreement.
            let differing = got.iter().zip(&expected).filter(|(g, e)| g != e).count();
            assert!(differing <= 1, "{differing} residues disagree");
            assert_eq!(a.clash_ok(&b, 2.5, &xa, &xb), !got.iter().any(|&f| f));
            if expected.iter().any(|&f| f) {
                clashing += 1;
            }
        }
        assert!(clashing > 0 && clashing < 60);
    }

    #[test]
    fn centroids_near_lists_residues_in_index_order() {
        let body = strand("s", 10);
        let near = body.centroids_near(&Point3::new(3.8 * 4.0, 1.0, 0.0), 4.5);
        let residues: Vec<usize> = near.iter().map(|&(i, _)| i).collect();
        assert_eq!(residues, vec![3, 4, 5]);
        assert!((near[1].1 - 1.0).abs() < 1e-4);
    }
}
