use super::traits::{DumpError, StructureDumper};
use crate::core::models::body::{Body, ResidueRange};
use crate::core::models::rigid_body::RigidBody;
use crate::core::models::xform::Xform;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

const CHAIN_IDS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Writes each (body, symmetry frame) copy as its own chain of PDB `ATOM` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdbDumper;

impl PdbDumper {
    pub fn new() -> Self {
        Self
    }

    /// Fails with [`ErrorKind::InvalidInput`] unless `frames` and `bounds` hold one entry per
    /// body.
    pub fn write_to(
        writer: &mut impl Write,
        bodies: &[&RigidBody],
        frames: &[Vec<Xform>],
        bounds: &[ResidueRange],
    ) -> std::io::Result<()> {
        if frames.len() != bodies.len() || bounds.len() != bodies.len() {
            return Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "{} bodies, {} frame lists, {} residue bounds",
                    bodies.len(),
                    frames.len(),
                    bounds.len()
                ),
            ));
        }
        let mut serial = 1usize;
        let mut chain = 0usize;
        for ((body, body_frames), range) in bodies.iter().zip(frames).zip(bounds) {
            for frame in body_frames {
                let chain_id = CHAIN_IDS[chain % CHAIN_IDS.len()] as char;
                let placement = frame * body.position();
                for (resi, residue) in body.residues().iter().enumerate() {
                    if !range.contains(resi) {
                        continue;
                    }
                    for atom in &residue.atoms {
                        let p = placement * atom.position;
                        writeln!(
                            writer,
                            "ATOM  {:>5} {:<4} {:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
                            serial % 100_000,
                            format_atom_name(&atom.name),
                            residue.name,
                            chain_id,
                            (resi + 1) % 10_000,
                            p.x,
                            p.y,
                            p.z,
                            1.0,
                            0.0,
                            atom.name.chars().next().unwrap_or('X'),
                        )?;
                        serial += 1;
                    }
                }
                writeln!(writer, "TER")?;
                chain += 1;
            }
        }
        writeln!(writer, "END")
    }
}

/// PDB convention: names shorter than four characters start in column 14.
fn format_atom_name(name: &str) -> String {
    if name.len() < 4 {
        format!(" {name}")
    } else {
        name.to_string()
    }
}

impl StructureDumper<RigidBody> for PdbDumper {
    fn dump(
        &self,
        path: &Path,
        bodies: &[&RigidBody],
        frames: &[Vec<Xform>],
        bounds: &[ResidueRange],
    ) -> Result<(), DumpError> {
        if frames.len() != bodies.len() || bounds.len() != bodies.len() {
            return Err(DumpError::Mismatch(format!(
                "{} bodies, {} frame lists, {} residue bounds",
                bodies.len(),
                frames.len(),
                bounds.len()
            )));
        }
        let io_err = |source| DumpError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(&mut writer, bodies, frames, bounds).map_err(io_err)?;
        writer.flush().map_err(io_err)
    }
}
