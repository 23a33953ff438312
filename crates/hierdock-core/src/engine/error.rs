use super::config::ConfigError;
use crate::core::sampling::HierarchyError;
use crate::core::scoring::table::ScoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error("Scoring failed: {source}")]
    Scoring {
        #[from]
        source: ScoreError,
    },

    #[error("Candidate batch field '{field}' has length {found}, expected {expected}")]
    BatchLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
