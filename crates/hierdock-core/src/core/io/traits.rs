use crate::core::models::body::{Body, ResidueRange};
use crate::core::models::xform::Xform;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("I/O error while writing '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Dump request is inconsistent: {0}")]
    Mismatch(String),
}

/// Writes placed bodies to a structure file.
///
/// Each body is expected to have been positioned with [`Body::move_to`]; `frames[k]` lists the
/// symmetry frames applied on top of that placement for body `k` and `bounds[k]` the residues
/// to write.
pub trait StructureDumper<B: Body>: Send + Sync {
    fn dump(
        &self,
        path: &Path,
        bodies: &[&B],
        frames: &[Vec<Xform>],
        bounds: &[ResidueRange],
    ) -> Result<(), DumpError>;
}
