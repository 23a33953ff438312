use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid interface summary '{0}'. Expected one of: min, sum, median, mean, max.")]
pub struct SummaryParseError(pub String);

/// Reduction of per-interface scores into one candidate score.
///
/// Non-finite inputs count as 0 so a single bad interface cannot poison the ranking, and an
/// empty input reduces to 0. Sentinel scores are ordinary values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMethod {
    #[default]
    Min,
    Sum,
    Median,
    Mean,
    Max,
}

impl SummaryMethod {
    pub fn reduce(self, values: &[f32]) -> f32 {
        if values.is_empty() {
            return 0.0;
        }
        let clean = values.iter().map(|&v| if v.is_finite() { v } else { 0.0 });
        match self {
            Self::Min => clean.fold(f32::INFINITY, f32::min),
            Self::Max => clean.fold(f32::NEG_INFINITY, f32::max),
            Self::Sum => clean.sum(),
            Self::Mean => clean.sum::<f32>() / values.len() as f32,
            Self::Median => {
                let mut sorted: Vec<f32> = clean.collect();
                sorted.sort_by(f32::total_cmp);
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 1 {
                    sorted[mid]
                } else {
                    0.5 * (sorted[mid - 1] + sorted[mid])
                }
            }
        }
    }
}

impl FromStr for SummaryMethod {
    type Err = SummaryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Ok(Self::Min),
            "sum" => Ok(Self::Sum),
            "median" => Ok(Self::Median),
            "mean" => Ok(Self::Mean),
            "max" => Ok(Self::Max),
            _ => Err(SummaryParseError(s.to_string())),
        }
    }
}

impl fmt::Display for SummaryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Min => "min",
            Self::Sum => "sum",
            Self::Median => "median",
            Self::Mean => "mean",
            Self::Max => "max",
        };
        f.write_str(s)
    }
}
