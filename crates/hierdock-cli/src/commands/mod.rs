pub mod cage;
pub mod cyclic;
pub mod plug;

use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use hierdock::core::io::body_csv::read_body;
use hierdock::core::models::body::TrimDirection;
use hierdock::core::models::cage::CageArch;
use hierdock::core::models::rigid_body::RigidBody;
use hierdock::core::models::symmetry::Symmetry;
use hierdock::core::scoring::table::HierScore;
use hierdock::engine::progress::ProgressReporter;
use hierdock::workflows::result::DockResult;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

/// Loads a body, labeled by its file stem.
fn load_body(path: &Path) -> Result<RigidBody> {
    let label = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "body".to_string());
    info!("Loading body '{}' from {:?}", label, path);
    read_body(path, &label).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn load_score(path: &Path) -> Result<HierScore> {
    info!("Loading score table from {:?}", path);
    HierScore::load(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn parse_symmetry(raw: &str) -> Result<Symmetry> {
    raw.parse::<Symmetry>()
        .map_err(|e| CliError::Argument(e.to_string()))
}

fn parse_arch(raw: &str) -> Result<CageArch> {
    raw.parse::<CageArch>()
        .map_err(|e| CliError::Argument(e.to_string()))
}

/// One direction per component, or none at all to use the configured direction everywhere.
fn parse_trim_directions(raw: &[String], ncomponents: usize) -> Result<Vec<Option<TrimDirection>>> {
    if raw.is_empty() {
        return Ok(vec![None; ncomponents]);
    }
    if raw.len() != ncomponents {
        return Err(CliError::Argument(format!(
            "expected {ncomponents} trim directions, one per component, got {}",
            raw.len()
        )));
    }
    raw.iter()
        .map(|d| {
            d.parse::<TrimDirection>()
                .map(Some)
                .map_err(|e| CliError::Argument(e.to_string()))
        })
        .collect()
}

fn reporter(show_progress: bool) -> ProgressReporter<'static> {
    if show_progress {
        ProgressReporter::with_callback(CliProgressHandler::new().get_callback())
    } else {
        ProgressReporter::new()
    }
}

fn write_outputs(result: &DockResult, result_path: &Path, csv_path: Option<&Path>) -> Result<()> {
    info!("Writing result table to {:?}", result_path);
    result.save(result_path)?;
    if let Some(csv_path) = csv_path {
        info!("Writing score table to {:?}", csv_path);
        result.write_csv(File::create(csv_path)?)?;
    }
    Ok(())
}

fn print_summary(result: &DockResult, result_path: &Path) {
    let Some(best) = result.best() else {
        warn!("Search completed but no placement survived.");
        println!("Warning: hierdock finished but found no valid placements.");
        return;
    };
    println!(
        "✓ {} model(s) written to: {} (best score {:.4})",
        result.len(),
        result_path.display(),
        best.score
    );
    for model in result.models.iter().take(5) {
        let ifaces: Vec<String> = model
            .interfaces
            .iter()
            .map(|i| format!("{}={:.3}", i.label, i.total))
            .collect();
        println!("  #{:<3} {:>10.4}  {}", model.model, model.score, ifaces.join(" "));
    }
}
