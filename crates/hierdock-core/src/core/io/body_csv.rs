use crate::core::models::residue::{Atom, Residue, SecondaryStructure};
use crate::core::models::rigid_body::{BodyError, RigidBody};
use nalgebra::Point3;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BodyLoadError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid secondary structure code '{code}' for residue {resi} in '{path}'")]
    InvalidSs {
        path: String,
        resi: i64,
        code: String,
    },
    #[error("Invalid body in '{path}': {source}")]
    Body { path: String, source: BodyError },
}

#[derive(Debug, Deserialize)]
struct AtomRecord {
    resi: i64,
    resn: String,
    ss: String,
    atom: String,
    x: f32,
    y: f32,
    z: f32,
}

/// Reads a body from a CSV file with the columns `resi,resn,ss,atom,x,y,z`.
///
/// Consecutive rows sharing a `resi` form one residue; residue order follows the file.
pub fn read_body(path: &Path, label: &str) -> Result<RigidBody, BodyLoadError> {
    let origin = path.to_string_lossy().to_string();
    let reader = csv::Reader::from_path(path).map_err(|e| BodyLoadError::Csv {
        path: origin.clone(),
        source: e,
    })?;
    read_records(reader, &origin, label)
}

pub fn read_body_from(
    reader: impl Read,
    origin: &str,
    label: &str,
) -> Result<RigidBody, BodyLoadError> {
    read_records(csv::Reader::from_reader(reader), origin, label)
}

fn read_records<R: Read>(
    mut reader: csv::Reader<R>,
    origin: &str,
    label: &str,
) -> Result<RigidBody, BodyLoadError> {
    let mut residues: Vec<Residue> = Vec::new();
    let mut current: Option<i64> = None;

    for result in reader.deserialize::<AtomRecord>() {
        let record = result.map_err(|e| BodyLoadError::Csv {
            path: origin.to_string(),
            source: e,
        })?;
        let atom = Atom::new(
            record.atom.trim(),
            Point3::new(record.x, record.y, record.z),
        );

        if current == Some(record.resi) {
            if let Some(residue) = residues.last_mut() {
                residue.atoms.push(atom);
            }
            continue;
        }

        let mut codes = record.ss.trim().chars();
        let ss = match (codes.next(), codes.next()) {
            (Some(c), None) => SecondaryStructure::from_code(c),
            _ => None,
        }
        .ok_or_else(|| BodyLoadError::InvalidSs {
            path: origin.to_string(),
            resi: record.resi,
            code: record.ss.clone(),
        })?;
        residues.push(Residue::new(record.resn.trim(), ss, vec![atom]));
        current = Some(record.resi);
    }

    RigidBody::new(label, residues).map_err(|e| BodyLoadError::Body {
        path: origin.to_string(),
        source: e,
    })
}
