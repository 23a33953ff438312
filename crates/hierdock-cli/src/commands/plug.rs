use super::{load_body, load_score, parse_symmetry, print_summary, reporter, write_outputs};
use crate::cli::PlugArgs;
use crate::config::builder::build_config;
use crate::config::models::{Protocol, ProtocolFlags};
use crate::error::Result;
use hierdock::core::io::pdb::PdbDumper;
use hierdock::core::io::traits::StructureDumper;
use hierdock::core::models::rigid_body::RigidBody;
use hierdock::workflows::{self, plug::PlugProblem};
use tracing::info;

pub fn run(args: PlugArgs, show_progress: bool) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let flags = ProtocolFlags {
        fixed_olig: args.fixed_olig,
        ..Default::default()
    };
    let app = build_config(&args.search, Protocol::Plug, &flags)?;

    let hole_sym = parse_symmetry(&args.hole_sym)?;
    let plug = load_body(&args.plug)?;
    let hole = load_body(&args.hole)?;
    let score = load_score(&app.score_path)?;

    let problem = PlugProblem {
        plug: &plug,
        hole: &hole,
        hole_sym,
        score: &score,
    };
    let dumper = PdbDumper::new();
    let dumper: &dyn StructureDumper<RigidBody> = &dumper;
    let reporter = reporter(show_progress);

    println!(
        "Starting plug docking of '{}' into {} hole '{}'...",
        args.plug.display(),
        args.hole_sym,
        args.hole.display()
    );
    info!("Invoking the plug docking workflow...");
    let result = workflows::plug::run(&problem, None, &app.search, Some(dumper), &reporter)?;

    write_outputs(&result, &app.result_path, app.csv_path.as_deref())?;
    print_summary(&result, &app.result_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SearchArgs;
    use crate::commands::cyclic::tests::{write_flat_score, write_strand};
    use crate::error::CliError;
    use hierdock::workflows::result::DockResult;
    use std::fs;
    use tempfile::tempdir;

    fn write_ring(path: &std::path::Path, radius: f32, n: usize) {
        let mut csv = String::from("resi,resn,ss,atom,x,y,z\n");
        for i in 0..n {
            let a = std::f32::consts::TAU * i as f32 / n as f32;
            csv.push_str(&format!(
                "{},ALA,E,CA,{:.3},{:.3},0.0\n",
                i + 1,
                radius * a.cos(),
                radius * a.sin()
            ));
        }
        fs::write(path, csv).unwrap();
    }

    #[test]
    fn plug_command_with_fixed_oligomer_records_sentinel() {
        let dir = tempdir().unwrap();
        let plug = dir.path().join("plug.csv");
        let hole = dir.path().join("hole.csv");
        let score = dir.path().join("score.toml");
        let output = dir.path().join("result.toml");
        write_strand(&plug, 'E');
        write_ring(&hole, 9.5, 12);
        write_flat_score(&score);

        let args = PlugArgs {
            plug,
            hole,
            hole_sym: "C3".to_string(),
            fixed_olig: true,
            search: SearchArgs {
                score,
                output: output.clone(),
                beam_size: Some(640),
                max_cluster: Some(4),
                ..Default::default()
            },
        };
        run(args, false).unwrap();

        let result = DockResult::load(&output).unwrap();
        assert_eq!(result.provenance.protocol, "plug");
        assert_eq!(result.provenance.bodies, vec!["plug".to_string(), "hole".to_string()]);
        assert!(result.provenance.config.plug_fixed_olig);
        assert_eq!(result.provenance.config.output_prefix, "plug");
        for model in &result.models {
            assert_eq!(model.interface("plug").unwrap().total, 9999.0);
        }
    }

    #[test]
    fn plug_command_reports_missing_hole() {
        let dir = tempdir().unwrap();
        let plug = dir.path().join("plug.csv");
        let score = dir.path().join("score.toml");
        write_strand(&plug, 'E');
        write_flat_score(&score);
        let args = PlugArgs {
            plug,
            hole: dir.path().join("absent.csv"),
            hole_sym: "C2".to_string(),
            fixed_olig: false,
            search: SearchArgs {
                score,
                output: dir.path().join("out.toml"),
                ..Default::default()
            },
        };
        assert!(matches!(run(args, false), Err(CliError::FileParsing { .. })));
    }
}
