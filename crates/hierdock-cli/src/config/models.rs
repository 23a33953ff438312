use hierdock::engine::config::SearchConfig;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Plug,
    Cyclic,
    Cage,
}

/// Protocol-specific flags that feed the shared search configuration.
#[derive(Debug, Clone, Default)]
pub struct ProtocolFlags {
    pub fixed_olig: bool,
    pub trimmable_components: Option<String>,
    pub max_delta_h: Option<f32>,
}

#[derive(Debug)]
pub struct AppConfig {
    pub score_path: PathBuf,
    pub result_path: PathBuf,
    pub csv_path: Option<PathBuf>,
    pub search: SearchConfig,
}
