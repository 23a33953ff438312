use crate::core::models::body::ResidueRange;
use crate::core::models::xform::{self, Xform, XformMatrix};
use crate::engine::config::SearchConfig;
use crate::engine::search::SearchStats;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResultIoError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("TOML parsing error for '{path}': {source}")]
    Deserialize {
        path: String,
        source: toml::de::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Score of one interface of a model, split into its motif-pair and contact-count parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterfaceScore {
    pub label: String,
    pub rpx: f32,
    pub ncontact: f32,
    pub total: f32,
}

impl InterfaceScore {
    pub fn new(label: &str, rpx: f32, ncontact: f32) -> Self {
        Self {
            label: label.to_string(),
            rpx,
            ncontact,
            total: rpx + ncontact,
        }
    }

    /// An interface that was not scored. The placeholder stands in for both parts and for the
    /// total, so every weighting of the breakdown reports the same value.
    pub fn sentinel(label: &str, value: f32) -> Self {
        Self {
            label: label.to_string(),
            rpx: value,
            ncontact: value,
            total: value,
        }
    }
}

/// Inclusive residue bounds kept for one body of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResidueBounds {
    pub body: String,
    pub lb: usize,
    pub ub: usize,
}

impl ResidueBounds {
    pub fn new(body: &str, range: ResidueRange) -> Self {
        Self {
            body: body.to_string(),
            lb: range.lb,
            ub: range.ub,
        }
    }

    pub fn range(&self) -> ResidueRange {
        ResidueRange::new(self.lb, self.ub)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DockModel {
    pub model: usize,
    pub score: f32,
    /// Placement of each moving body, in the order of [`Provenance::bodies`].
    pub xforms: Vec<XformMatrix>,
    pub interfaces: Vec<InterfaceScore>,
    pub bounds: Vec<ResidueBounds>,
}

impl DockModel {
    /// The stored placements as rigid transforms; `None` if any matrix is not rigid.
    pub fn transforms(&self) -> Option<Vec<Xform>> {
        self.xforms.iter().map(xform::from_matrix).collect()
    }

    /// The placement of the first moving body.
    pub fn transform(&self) -> Option<Xform> {
        self.xforms.first().and_then(xform::from_matrix)
    }

    pub fn interface(&self, label: &str) -> Option<&InterfaceScore> {
        self.interfaces.iter().find(|i| i.label == label)
    }
}

/// How a result was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Provenance {
    pub protocol: String,
    pub symmetry: String,
    pub bodies: Vec<String>,
    pub nresl: usize,
    pub elapsed_seconds: f64,
    pub dump_seconds: f64,
    pub config: SearchConfig,
    pub stats: SearchStats,
}

/// Labeled, persistable docking result: one [`DockModel`] per accepted placement, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DockResult {
    pub provenance: Provenance,
    #[serde(default)]
    pub models: Vec<DockModel>,
}

impl DockResult {
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn best(&self) -> Option<&DockModel> {
        self.models.first()
    }

    pub fn to_toml_string(&self) -> Result<String, ResultIoError> {
        Ok(toml::to_string(self)?)
    }

    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ResultIoError> {
        toml::from_str(content).map_err(|e| ResultIoError::Deserialize {
            path: origin.to_string(),
            source: e,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ResultIoError> {
        let content = self.to_toml_string()?;
        fs::write(path, content).map_err(|e| ResultIoError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ResultIoError> {
        let origin = path.to_string_lossy().to_string();
        let content = fs::read_to_string(path).map_err(|e| ResultIoError::Io {
            path: origin.clone(),
            source: e,
        })?;
        Self::from_toml_str(&content, &origin)
    }

    /// Flat per-model score table: `model,score`, then `total_`, `rpx_` and `ncontact_` columns
    /// per interface and `lb_`/`ub_` columns per body.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ResultIoError> {
        let mut out = csv::Writer::from_writer(writer);
        let Some(first) = self.models.first() else {
            out.write_record(["model", "score"])?;
            out.flush().map_err(|e| ResultIoError::Io {
                path: "<csv>".into(),
                source: e,
            })?;
            return Ok(());
        };

        let mut header = vec!["model".to_string(), "score".to_string()];
        for iface in &first.interfaces {
            for part in ["total", "rpx", "ncontact"] {
                header.push(format!("{part}_{}", iface.label));
            }
        }
        for bounds in &first.bounds {
            header.push(format!("lb_{}", bounds.body));
            header.push(format!("ub_{}", bounds.body));
        }
        out.write_record(&header)?;

        for model in &self.models {
            let mut row = vec![model.model.to_string(), model.score.to_string()];
            for iface in &model.interfaces {
                row.push(iface.total.to_string());
                row.push(iface.rpx.to_string());
                row.push(iface.ncontact.to_string());
            }
            for bounds in &model.bounds {
                row.push(bounds.lb.to_string());
                row.push(bounds.ub.to_string());
            }
            out.write_record(&row)?;
        }
        out.flush().map_err(|e| ResultIoError::Io {
            path: "<csv>".into(),
            source: e,
        })
    }
}
