//! Data models for rigid docking: transforms, residues, bodies, cyclic symmetry and the point
//! groups of multi-component cages.
//!
//! [`body::Body`] is the narrow interface the search engine talks to. [`rigid_body::RigidBody`]
//! is the coordinate-based implementation used by the workflows and the CLI.

pub mod body;
pub mod cage;
pub mod residue;
pub mod rigid_body;
pub mod symmetry;
pub mod xform;
