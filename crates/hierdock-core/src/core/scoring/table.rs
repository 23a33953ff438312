use super::weights::Weights;
use crate::core::models::body::{Body, ResidueRange};
use crate::core::models::residue::{SecondaryStructure, SsFilter};
use crate::core::models::xform::Xform;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid secondary structure pair '{key}' in level {level} of '{path}'")]
    InvalidPairKey {
        path: String,
        level: usize,
        key: String,
    },
    #[error("Invalid score level {level} in '{path}': {reason}")]
    InvalidLevel {
        path: String,
        level: usize,
        reason: String,
    },
    #[error("Score table '{0}' has no levels")]
    Empty(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("Score level {level} requested but the table has only {nresl} levels")]
    LevelOutOfRange { level: usize, nresl: usize },
}

/// One pairwise scoring request: two placed bodies and the residue ranges that take part.
#[derive(Debug, Clone, Copy)]
pub struct PairQuery<'a, B: Body> {
    pub level: usize,
    pub body_a: &'a B,
    pub body_b: &'a B,
    pub xform_a: &'a Xform,
    pub xform_b: &'a Xform,
    pub range_a: ResidueRange,
    pub range_b: ResidueRange,
}

/// A resolution-addressed residue-pair score lookup.
pub trait ScoreTable: Send + Sync {
    /// Number of resolution levels the table provides.
    fn nresl(&self) -> usize;

    /// `(cartesian, orientation in degrees)` sampling resolution the coarsest level was built for.
    fn base_resolution(&self) -> (f32, f32);

    fn score<B: Body>(
        &self,
        query: &PairQuery<'_, B>,
        weights: &Weights,
        ss_filter: &SsFilter,
    ) -> Result<f32, ScoreError>;
}

/// Binned distance profile per secondary-structure pair for one resolution level.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreLevel {
    pub max_pair_dist: f32,
    pub bin_width: f32,
    profiles: [[Vec<f32>; 3]; 3],
}

impl ScoreLevel {
    pub fn new(max_pair_dist: f32, bin_width: f32) -> Self {
        Self {
            max_pair_dist,
            bin_width,
            profiles: Default::default(),
        }
    }

    /// Sets the profile for the pair `(a, b)` and, symmetrically, `(b, a)`.
    pub fn with_profile(
        mut self,
        a: SecondaryStructure,
        b: SecondaryStructure,
        profile: Vec<f32>,
    ) -> Self {
        self.profiles[b.index()][a.index()] = profile.clone();
        self.profiles[a.index()][b.index()] = profile;
        self
    }

    #[inline]
    pub fn lookup(&self, a: SecondaryStructure, b: SecondaryStructure, dist: f32) -> f32 {
        let bin = (dist / self.bin_width) as usize;
        self.profiles[a.index()][b.index()]
            .get(bin)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Raw components of one interface score.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairTerms {
    pub rpx: f32,
    pub ncontact: u32,
}

/// Multi-level residue-pair score table.
#[derive(Debug, Clone, PartialEq)]
pub struct HierScore {
    cart_resl: f32,
    ori_resl: f32,
    levels: Vec<ScoreLevel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ScoreFile {
    cart_resl: f32,
    ori_resl: f32,
    levels: Vec<LevelEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct LevelEntry {
    max_pair_dist: f32,
    bin_width: f32,
    #[serde(default)]
    pairs: BTreeMap<String, Vec<f32>>,
}

impl HierScore {
    pub fn new(
        cart_resl: f32,
        ori_resl: f32,
        levels: Vec<ScoreLevel>,
    ) -> Result<Self, ScoreLoadError> {
        Self::checked(cart_resl, ori_resl, levels, "<memory>")
    }

    pub fn load(path: &Path) -> Result<Self, ScoreLoadError> {
        let origin = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ScoreLoadError::Io {
            path: origin.clone(),
            source: e,
        })?;
        Self::from_toml_str(&content, &origin)
    }

    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ScoreLoadError> {
        let file: ScoreFile = toml::from_str(content).map_err(|e| ScoreLoadError::Toml {
            path: origin.to_string(),
            source: e,
        })?;

        let mut levels = Vec::with_capacity(file.levels.len());
        for (index, entry) in file.levels.into_iter().enumerate() {
            let mut level = ScoreLevel::new(entry.max_pair_dist, entry.bin_width);
            for (key, profile) in &entry.pairs {
                let (a, b) = parse_pair_key(key).ok_or_else(|| ScoreLoadError::InvalidPairKey {
                    path: origin.to_string(),
                    level: index,
                    key: key.clone(),
                })?;
                level.profiles[a.index()][b.index()] = profile.clone();
                // An explicit reverse key takes precedence over the symmetric fill.
                let reverse: String = [b.code(), a.code()].iter().collect();
                if !entry.pairs.contains_key(&reverse) {
                    level.profiles[b.index()][a.index()] = profile.clone();
                }
            }
            levels.push(level);
        }
        Self::checked(file.cart_resl, file.ori_resl, levels, origin)
    }

    fn checked(
        cart_resl: f32,
        ori_resl: f32,
        levels: Vec<ScoreLevel>,
        origin: &str,
    ) -> Result<Self, ScoreLoadError> {
        if levels.is_empty() {
            return Err(ScoreLoadError::Empty(origin.to_string()));
        }
        let invalid = |level: usize, reason: String| ScoreLoadError::InvalidLevel {
            path: origin.to_string(),
            level,
            reason,
        };
        if !(cart_resl > 0.0 && ori_resl > 0.0) {
            return Err(invalid(
                0,
                format!("base resolution must be positive, got ({cart_resl}, {ori_resl})"),
            ));
        }
        for (i, level) in levels.iter().enumerate() {
            if !(level.max_pair_dist.is_finite() && level.max_pair_dist > 0.0) {
                return Err(invalid(i, "max-pair-dist must be positive".into()));
            }
            if !(level.bin_width.is_finite() && level.bin_width > 0.0) {
                return Err(invalid(i, "bin-width must be positive".into()));
            }
        }
        Ok(Self {
            cart_resl,
            ori_resl,
            levels,
        })
    }

    pub fn level(&self, level: usize) -> Result<&ScoreLevel, ScoreError> {
        self.levels.get(level).ok_or(ScoreError::LevelOutOfRange {
            level,
            nresl: self.levels.len(),
        })
    }

    /// Motif score sum and contact count between the in-range, SS-allowed residues of the two
    /// placed bodies.
    pub fn pair_terms<B: Body>(
        &self,
        query: &PairQuery<'_, B>,
        ss_filter: &SsFilter,
    ) -> Result<PairTerms, ScoreError> {
        let level = self.level(query.level)?;
        let ss_a = query.body_a.secondary_structure();
        let ss_b = query.body_b.secondary_structure();
        // Centroids of `a` are taken into the frame of `b`, where its neighbour index lives.
        let rel = query.xform_b.inverse() * query.xform_a;

        let mut terms = PairTerms::default();
        for (i, c) in query.body_a.residue_centroids().iter().enumerate() {
            if !query.range_a.contains(i) || !ss_filter.allows(ss_a[i]) {
                continue;
            }
            for (j, d2) in query.body_b.centroids_near(&(rel * c), level.max_pair_dist) {
                if query.range_b.contains(j) && ss_filter.allows(ss_b[j]) {
                    terms.ncontact += 1;
                    terms.rpx += level.lookup(ss_a[i], ss_b[j], d2.sqrt());
                }
            }
        }
        Ok(terms)
    }
}

fn parse_pair_key(key: &str) -> Option<(SecondaryStructure, SecondaryStructure)> {
    let mut chars = key.chars();
    let a = SecondaryStructure::from_code(chars.next()?)?;
    let b = SecondaryStructure::from_code(chars.next()?)?;
    if chars.next().is_some() {
        return None;
    }
    Some((a, b))
}

impl ScoreTable for HierScore {
    fn nresl(&self) -> usize {
        self.levels.len()
    }

    fn base_resolution(&self) -> (f32, f32) {
        (self.cart_resl, self.ori_resl)
    }

    fn score<B: Body>(
        &self,
        query: &PairQuery<'_, B>,
        weights: &Weights,
        ss_filter: &SsFilter,
    ) -> Result<f32, ScoreError> {
        let terms = self.pair_terms(query, ss_filter)?;
        Ok(weights.rpx * terms.rpx + weights.ncontact * terms.ncontact as f32)
    }
}
