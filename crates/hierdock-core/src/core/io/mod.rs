//! Body readers and structure dumpers.
//!
//! - [`body_csv`] reads residue/atom tables into [`crate::core::models::rigid_body::RigidBody`].
//! - [`traits::StructureDumper`] is the output collaborator the workflows call for the top
//!   results; [`pdb::PdbDumper`] writes PDB ATOM records.

pub mod body_csv;
pub mod pdb;
pub mod traits;
