use super::{
    load_body, load_score, parse_arch, parse_trim_directions, print_summary, reporter,
    write_outputs,
};
use crate::cli::CageArgs;
use crate::config::builder::build_config;
use crate::config::models::{Protocol, ProtocolFlags};
use crate::error::{CliError, Result};
use hierdock::core::io::pdb::PdbDumper;
use hierdock::core::io::traits::StructureDumper;
use hierdock::core::models::rigid_body::RigidBody;
use hierdock::workflows::{
    self,
    cage::{CageComponent, CageProblem},
};
use tracing::info;

pub fn run(args: CageArgs, show_progress: bool) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let flags = ProtocolFlags {
        fixed_olig: false,
        trimmable_components: args.trimmable_components.clone(),
        max_delta_h: args.max_delta_h,
    };
    let app = build_config(&args.search, Protocol::Cage, &flags)?;

    let arch = parse_arch(&args.arch)?;
    if args.bodies.len() != arch.ncomponents() {
        return Err(CliError::Argument(format!(
            "{arch} has {} components but {} bodies were given",
            arch.ncomponents(),
            args.bodies.len()
        )));
    }
    let directions = parse_trim_directions(&args.trim_directions, arch.ncomponents())?;
    let bodies = args
        .bodies
        .iter()
        .map(|path| load_body(path))
        .collect::<Result<Vec<RigidBody>>>()?;
    let score = load_score(&app.score_path)?;

    let problem = CageProblem {
        arch,
        components: bodies
            .iter()
            .zip(directions)
            .map(|(body, trim_direction)| CageComponent {
                body,
                trim_direction,
            })
            .collect(),
        score: &score,
    };
    let dumper = PdbDumper::new();
    let dumper: &dyn StructureDumper<RigidBody> = &dumper;
    let reporter = reporter(show_progress);

    println!(
        "Starting {} cage docking of {} component(s)...",
        problem.arch,
        bodies.len()
    );
    info!("Invoking the cage docking workflow...");
    let result = workflows::cage::run(&problem, None, &app.search, Some(dumper), &reporter)?;

    write_outputs(&result, &app.result_path, app.csv_path.as_deref())?;
    print_summary(&result, &app.result_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SearchArgs;
    use crate::commands::cyclic::tests::{write_flat_score, write_strand};
    use hierdock::workflows::result::DockResult;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn cage_command_writes_result_csv_and_models() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("compA.csv");
        let b = dir.path().join("compB.csv");
        let score = dir.path().join("score.toml");
        let output = dir.path().join("result.toml");
        let csv = dir.path().join("result.csv");
        write_strand(&a, 'E');
        write_strand(&b, 'E');
        write_flat_score(&score);

        let prefix = dir.path().join("t33").to_string_lossy().to_string();
        let args = CageArgs {
            arch: "T33".to_string(),
            bodies: vec![a, b],
            trim_directions: vec!["C".to_string(), "C".to_string()],
            trimmable_components: Some("AB".to_string()),
            max_delta_h: None,
            search: SearchArgs {
                score,
                output: output.clone(),
                csv: Some(csv.clone()),
                beam_size: Some(1600),
                max_trim: Some(1),
                max_cluster: Some(4),
                nout_top: Some(1),
                output_prefix: Some(prefix.clone()),
                ..Default::default()
            },
        };
        run(args, false).unwrap();

        let result = DockResult::load(&output).unwrap();
        assert_eq!(result.provenance.protocol, "cage");
        assert_eq!(result.provenance.symmetry, "T33");
        assert_eq!(
            result.provenance.bodies,
            vec!["compA".to_string(), "compB".to_string()]
        );
        assert_eq!(result.provenance.config.trimmable_components, "AB");
        assert!(!result.is_empty() && result.len() <= 4);
        for model in &result.models {
            assert_eq!(model.xforms.len(), 2);
            for bounds in &model.bounds {
                assert_eq!(bounds.lb, 0);
            }
        }

        let table = fs::read_to_string(&csv).unwrap();
        let header = table.lines().next().unwrap();
        assert!(header.contains("total_AB"));
        assert!(header.contains("lb_compA") && header.contains("ub_compB"));
        assert_eq!(table.lines().count(), result.len() + 1);
        assert!(Path::new(&format!("{prefix}_00.pdb")).exists());
        assert!(!Path::new(&format!("{prefix}_01.pdb")).exists());
    }

    #[test]
    fn component_count_must_match_the_architecture() {
        let dir = tempdir().unwrap();
        let args = CageArgs {
            arch: "I53".to_string(),
            bodies: vec![dir.path().join("only.csv")],
            trim_directions: Vec::new(),
            trimmable_components: None,
            max_delta_h: None,
            search: SearchArgs {
                score: dir.path().join("missing.toml"),
                output: dir.path().join("out.toml"),
                ..Default::default()
            },
        };
        let err = run(args, false).unwrap_err();
        assert!(matches!(err, CliError::Argument(msg) if msg.contains("I53")));
    }
}
