use crate::core::models::body::TrimDirection;
use crate::core::models::residue::SsFilter;
use crate::core::sampling::MAX_NCHILD;
use crate::core::scoring::summary::SummaryMethod;
use crate::core::scoring::weights::{Weights, WeightsError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for '{param}': {reason}")]
    InvalidValue { param: &'static str, reason: String },
    #[error("Requested {requested} resolution levels but only {available} are available")]
    LevelOutOfRange { requested: usize, available: usize },
    #[error(transparent)]
    Weights(#[from] WeightsError),
}

/// Every option of a hierarchical docking search.
///
/// Serialized as part of the result provenance; unknown keys are rejected on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SearchConfig {
    /// Upper bound on the number of candidates evaluated at every level after the first.
    pub beam_size: usize,
    /// Number of resolution levels to run; all levels of the score table when unset.
    pub nresl: Option<usize>,
    pub clash_dist: f32,
    pub max_trim: usize,
    pub trim_direction: TrimDirection,
    /// Maximum `|z|` of the body's long axis after placement.
    pub max_longaxis_dot_z: f32,
    pub iface_summary: SummaryMethod,
    pub weights: Weights,
    pub max_bb_redundancy: f32,
    /// Cap on the number of results kept after redundancy filtering; 0 keeps all.
    pub max_cluster: usize,
    pub score_only_ss: SsFilter,
    pub plug_fixed_olig: bool,
    /// Letters of the cage components (`A` is the first) whose residues may be trimmed.
    pub trimmable_components: String,
    /// Largest allowed difference between the slide offsets of two cage components.
    pub max_delta_h: f32,
    pub nout_debug: usize,
    /// Number of top models written as structures.
    pub nout_top: usize,
    pub output_prefix: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            beam_size: 100_000,
            nresl: None,
            clash_dist: 3.5,
            max_trim: 0,
            trim_direction: TrimDirection::NC,
            max_longaxis_dot_z: 1.000001,
            iface_summary: SummaryMethod::Min,
            weights: Weights::default(),
            max_bb_redundancy: 3.0,
            max_cluster: 0,
            score_only_ss: SsFilter::all(),
            plug_fixed_olig: false,
            trimmable_components: ('A'..='Z').collect(),
            max_delta_h: 9999.0,
            nout_debug: 0,
            nout_top: 0,
            output_prefix: "hierdock".to_string(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |param, reason: String| Err(ConfigError::InvalidValue { param, reason });
        if (self.beam_size as u64) < MAX_NCHILD {
            return invalid(
                "beam_size",
                format!(
                    "must be at least {MAX_NCHILD} (one expanded cell), got {}",
                    self.beam_size
                ),
            );
        }
        if self.nresl == Some(0) {
            return invalid("nresl", "must be at least 1".into());
        }
        if !(self.clash_dist.is_finite() && self.clash_dist >= 0.0) {
            return invalid(
                "clash_dist",
                format!("must be a non-negative number, got {}", self.clash_dist),
            );
        }
        if !(self.max_longaxis_dot_z.is_finite() && self.max_longaxis_dot_z > 0.0) {
            return invalid(
                "max_longaxis_dot_z",
                format!("must be positive, got {}", self.max_longaxis_dot_z),
            );
        }
        if !self.max_bb_redundancy.is_finite() {
            return invalid(
                "max_bb_redundancy",
                format!("must be finite, got {}", self.max_bb_redundancy),
            );
        }
        if !self
            .trimmable_components
            .chars()
            .all(|c| c.is_ascii_uppercase())
        {
            return invalid(
                "trimmable_components",
                format!(
                    "must be upper-case component letters, got '{}'",
                    self.trimmable_components
                ),
            );
        }
        if self.max_delta_h.is_nan() || self.max_delta_h < 0.0 {
            return invalid(
                "max_delta_h",
                format!("must be non-negative, got {}", self.max_delta_h),
            );
        }
        if self.output_prefix.is_empty() {
            return invalid("output_prefix", "must not be empty".into());
        }
        self.weights.validate()?;
        Ok(())
    }

    /// Whether cage component `k` (0 is `A`) may be trimmed.
    pub fn is_trimmable(&self, k: usize) -> bool {
        u8::try_from(k)
            .ok()
            .and_then(|k| b'A'.checked_add(k))
            .is_some_and(|letter| self.trimmable_components.contains(letter as char))
    }

    /// How many top models a workflow writes when given a structure dumper.
    pub fn ndump(&self) -> usize {
        self.nout_top.max(self.nout_debug)
    }

    /// Number of levels to search, bounded by both the score table and the sampling hierarchy.
    pub fn resolve_nresl(
        &self,
        score_levels: usize,
        hierarchy_depth: usize,
    ) -> Result<usize, ConfigError> {
        let available = score_levels.min(hierarchy_depth);
        let requested = self.nresl.unwrap_or(score_levels);
        if requested == 0 || requested > available {
            return Err(ConfigError::LevelOutOfRange {
                requested,
                available,
            });
        }
        Ok(requested)
    }
}

#[derive(Default)]
pub struct SearchConfigBuilder {
    beam_size: Option<usize>,
    nresl: Option<usize>,
    clash_dist: Option<f32>,
    max_trim: Option<usize>,
    trim_direction: Option<TrimDirection>,
    max_longaxis_dot_z: Option<f32>,
    iface_summary: Option<SummaryMethod>,
    weights: Option<Weights>,
    max_bb_redundancy: Option<f32>,
    max_cluster: Option<usize>,
    score_only_ss: Option<SsFilter>,
    plug_fixed_olig: Option<bool>,
    trimmable_components: Option<String>,
    max_delta_h: Option<f32>,
    nout_debug: Option<usize>,
    nout_top: Option<usize>,
    output_prefix: Option<String>,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn beam_size(mut self, n: usize) -> Self {
        self.beam_size = Some(n);
        self
    }
    pub fn nresl(mut self, n: usize) -> Self {
        self.nresl = Some(n);
        self
    }
    pub fn clash_dist(mut self, dist: f32) -> Self {
        self.clash_dist = Some(dist);
        self
    }
    pub fn max_trim(mut self, n: usize) -> Self {
        self.max_trim = Some(n);
        self
    }
    pub fn trim_direction(mut self, direction: TrimDirection) -> Self {
        self.trim_direction = Some(direction);
        self
    }
    pub fn max_longaxis_dot_z(mut self, value: f32) -> Self {
        self.max_longaxis_dot_z = Some(value);
        self
    }
    pub fn iface_summary(mut self, method: SummaryMethod) -> Self {
        self.iface_summary = Some(method);
        self
    }
    pub fn weights(mut self, weights: Weights) -> Self {
        self.weights = Some(weights);
        self
    }
    pub fn max_bb_redundancy(mut self, rms: f32) -> Self {
        self.max_bb_redundancy = Some(rms);
        self
    }
    pub fn max_cluster(mut self, n: usize) -> Self {
        self.max_cluster = Some(n);
        self
    }
    pub fn score_only_ss(mut self, filter: SsFilter) -> Self {
        self.score_only_ss = Some(filter);
        self
    }
    pub fn plug_fixed_olig(mut self, fixed: bool) -> Self {
        self.plug_fixed_olig = Some(fixed);
        self
    }
    pub fn trimmable_components(mut self, letters: &str) -> Self {
        self.trimmable_components = Some(letters.trim().to_ascii_uppercase());
        self
    }
    pub fn max_delta_h(mut self, dist: f32) -> Self {
        self.max_delta_h = Some(dist);
        self
    }
    pub fn nout_debug(mut self, n: usize) -> Self {
        self.nout_debug = Some(n);
        self
    }
    pub fn nout_top(mut self, n: usize) -> Self {
        self.nout_top = Some(n);
        self
    }
    pub fn output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = Some(prefix.into());
        self
    }

    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let d = SearchConfig::default();
        let config = SearchConfig {
            beam_size: self.beam_size.unwrap_or(d.beam_size),
            nresl: self.nresl.or(d.nresl),
            clash_dist: self.clash_dist.unwrap_or(d.clash_dist),
            max_trim: self.max_trim.unwrap_or(d.max_trim),
            trim_direction: self.trim_direction.unwrap_or(d.trim_direction),
            max_longaxis_dot_z: self.max_longaxis_dot_z.unwrap_or(d.max_longaxis_dot_z),
            iface_summary: self.iface_summary.unwrap_or(d.iface_summary),
            weights: self.weights.unwrap_or(d.weights),
            max_bb_redundancy: self.max_bb_redundancy.unwrap_or(d.max_bb_redundancy),
            max_cluster: self.max_cluster.unwrap_or(d.max_cluster),
            score_only_ss: self.score_only_ss.unwrap_or(d.score_only_ss),
            plug_fixed_olig: self.plug_fixed_olig.unwrap_or(d.plug_fixed_olig),
            trimmable_components: self.trimmable_components.unwrap_or(d.trimmable_components),
            max_delta_h: self.max_delta_h.unwrap_or(d.max_delta_h),
            nout_debug: self.nout_debug.unwrap_or(d.nout_debug),
            nout_top: self.nout_top.unwrap_or(d.nout_top),
            output_prefix: self.output_prefix.unwrap_or(d.output_prefix),
        };
        config.validate()?;
        Ok(config)
    }
}
