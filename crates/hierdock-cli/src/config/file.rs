use crate::error::{CliError, Result};
use hierdock::core::models::body::TrimDirection;
use hierdock::core::models::residue::SsFilter;
use hierdock::core::scoring::summary::SummaryMethod;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSearchConfig {
    pub beam_size: Option<usize>,
    pub nresl: Option<usize>,
    pub clash_dist: Option<f32>,
    pub max_trim: Option<usize>,
    pub trim_direction: Option<TrimDirection>,
    pub max_longaxis_dot_z: Option<f32>,
    pub iface_summary: Option<SummaryMethod>,
    pub max_bb_redundancy: Option<f32>,
    pub max_cluster: Option<usize>,
    pub score_only_ss: Option<SsFilter>,
    pub plug_fixed_olig: Option<bool>,
    pub trimmable_components: Option<String>,
    pub max_delta_h: Option<f32>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileOutputConfig {
    pub nout_debug: Option<usize>,
    pub nout_top: Option<usize>,
    pub prefix: Option<String>,
}

/// On-disk configuration. Every value is optional; missing values fall back to the defaults.
///
/// ```toml
/// [search]
/// beam-size = 50000
/// max-trim = 10
/// trim-direction = "C"
/// trimmable-components = "AB"
///
/// [weights]
/// ncontact = 0.1
///
/// [output]
/// nout-top = 5
/// ```
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub search: Option<FileSearchConfig>,
    /// Kept as raw names so unknown keys are reported by the weights parser.
    pub weights: Option<BTreeMap<String, f32>>,
    pub output: Option<FileOutputConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
