use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecondaryStructure {
    Helix,
    Strand,
    Loop,
}

impl SecondaryStructure {
    pub const ALL: [SecondaryStructure; 3] = [Self::Helix, Self::Strand, Self::Loop];

    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'H' => Some(Self::Helix),
            'E' => Some(Self::Strand),
            'L' => Some(Self::Loop),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Self::Helix => 'H',
            Self::Strand => 'E',
            Self::Loop => 'L',
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Helix => 0,
            Self::Strand => 1,
            Self::Loop => 2,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid secondary structure filter '{0}'. Expected a non-empty combination of 'E', 'H' and 'L'.")]
pub struct SsFilterParseError(pub String);

/// Set of secondary-structure types whose residues take part in scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SsFilter {
    allowed: [bool; 3],
}

impl SsFilter {
    pub fn all() -> Self {
        Self {
            allowed: [true; 3],
        }
    }

    #[inline]
    pub fn allows(&self, ss: SecondaryStructure) -> bool {
        self.allowed[ss.index()]
    }
}

impl Default for SsFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for SsFilter {
    type Err = SsFilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut allowed = [false; 3];
        for c in s.trim().chars() {
            let ss = SecondaryStructure::from_code(c).ok_or_else(|| SsFilterParseError(s.into()))?;
            allowed[ss.index()] = true;
        }
        if !allowed.iter().any(|&a| a) {
            return Err(SsFilterParseError(s.into()));
        }
        Ok(Self { allowed })
    }
}

impl TryFrom<String> for SsFilter {
    type Error = SsFilterParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SsFilter> for String {
    fn from(filter: SsFilter) -> Self {
        filter.to_string()
    }
}

impl fmt::Display for SsFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Canonical "EHL" ordering.
        for ss in [
            SecondaryStructure::Strand,
            SecondaryStructure::Helix,
            SecondaryStructure::Loop,
        ] {
            if self.allows(ss) {
                write!(f, "{}", ss.code())?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub name: String,
    pub position: Point3<f32>,
}

impl Atom {
    pub fn new(name: &str, position: Point3<f32>) -> Self {
        Self {
            name: name.to_string(),
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub name: String,
    pub ss: SecondaryStructure,
    pub atoms: Vec<Atom>,
}

impl Residue {
    pub fn new(name: &str, ss: SecondaryStructure, atoms: Vec<Atom>) -> Self {
        Self {
            name: name.to_string(),
            ss,
            atoms,
        }
    }

    /// Mean position of the residue's atoms, `None` for an atomless residue.
    pub fn centroid(&self) -> Option<Point3<f32>> {
        if self.atoms.is_empty() {
            return None;
        }
        let sum = self
            .atoms
            .iter()
            .fold(nalgebra::Vector3::zeros(), |acc, a| acc + a.position.coords);
        Some(Point3::from(sum / self.atoms.len() as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ss_filter_parses_any_order_and_case() {
        let f: SsFilter = "lh".parse().unwrap();
        assert!(f.allows(SecondaryStructure::Helix));
        assert!(f.allows(SecondaryStructure::Loop));
        assert!(!f.allows(SecondaryStructure::Strand));
        assert_eq!(f.to_string(), "HL");
    }

    #[test]
    fn ss_filter_rejects_unknown_codes_and_empty_strings() {
        assert!("HX".parse::<SsFilter>().is_err());
        assert!("".parse::<SsFilter>().is_err());
    }

    #[test]
    fn default_filter_allows_everything() {
        let f = SsFilter::default();
        assert!(SecondaryStructure::ALL.iter().all(|&ss| f.allows(ss)));
        assert_eq!(f.to_string(), "EHL");
    }

    #[test]
    fn residue_centroid_is_atom_mean() {
        let r = Residue::new(
            "ALA",
            SecondaryStructure::Helix,
            vec![
                Atom::new("N", Point3::new(0.0, 0.0, 0.0)),
                Atom::new("CA", Point3::new(2.0, 4.0, -2.0)),
            ],
        );
        assert_eq!(r.centroid(), Some(Point3::new(1.0, 2.0, -1.0)));
        assert_eq!(Residue::new("GLY", SecondaryStructure::Loop, vec![]).centroid(), None);
    }
}
