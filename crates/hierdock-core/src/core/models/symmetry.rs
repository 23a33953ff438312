use super::xform::{self, Xform};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymmetryError {
    #[error("Unsupported symmetry '{0}'. Only cyclic groups 'C2', 'C3', ... are supported.")]
    Unsupported(String),
}

/// A point-group symmetry whose axis is the z axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Symmetry {
    Cyclic { nfold: u32 },
}

impl Symmetry {
    pub fn cyclic(nfold: u32) -> Result<Self, SymmetryError> {
        if nfold < 2 {
            return Err(SymmetryError::Unsupported(format!("C{nfold}")));
        }
        Ok(Self::Cyclic { nfold })
    }

    pub fn nfold(&self) -> u32 {
        match self {
            Self::Cyclic { nfold } => *nfold,
        }
    }

    /// The generating operator: a rotation of `360 / n` degrees about z.
    pub fn symrot(&self) -> Xform {
        xform::rotation_about_z(360.0 / self.nfold() as f32)
    }

    /// All `n` frames of the group, starting with the identity.
    pub fn frames(&self) -> Vec<Xform> {
        let step = 360.0 / self.nfold() as f32;
        (0..self.nfold())
            .map(|i| xform::rotation_about_z(step * i as f32))
            .collect()
    }

    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Symmetry {
    type Err = SymmetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let unsupported = || SymmetryError::Unsupported(s.to_string());
        let digits = trimmed
            .strip_prefix('C')
            .or_else(|| trimmed.strip_prefix('c'))
            .ok_or_else(unsupported)?;
        let nfold: u32 = digits.parse().map_err(|_| unsupported())?;
        Self::cyclic(nfold).map_err(|_| unsupported())
    }
}

impl TryFrom<String> for Symmetry {
    type Error = SymmetryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Symmetry> for String {
    fn from(sym: Symmetry) -> Self {
        sym.to_string()
    }
}

impl fmt::Display for Symmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cyclic { nfold } => write!(f, "C{nfold}"),
        }
    }
}
