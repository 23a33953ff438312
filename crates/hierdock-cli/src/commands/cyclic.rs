use super::{load_body, load_score, parse_symmetry, print_summary, reporter, write_outputs};
use crate::cli::CyclicArgs;
use crate::config::builder::build_config;
use crate::config::models::{Protocol, ProtocolFlags};
use crate::error::Result;
use hierdock::core::io::pdb::PdbDumper;
use hierdock::core::io::traits::StructureDumper;
use hierdock::core::models::rigid_body::RigidBody;
use hierdock::workflows;
use tracing::info;

pub fn run(args: CyclicArgs, show_progress: bool) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app = build_config(&args.search, Protocol::Cyclic, &ProtocolFlags::default())?;

    let sym = parse_symmetry(&args.sym)?;
    let body = load_body(&args.body)?;
    let score = load_score(&app.score_path)?;

    let dumper = PdbDumper::new();
    let dumper: &dyn StructureDumper<RigidBody> = &dumper;
    let reporter = reporter(show_progress);

    println!("Starting {} docking of '{}'...", sym, args.body.display());
    info!("Invoking the cyclic docking workflow...");
    let result = workflows::cyclic::run(
        &body,
        &sym,
        &score,
        None,
        &app.search,
        Some(dumper),
        &reporter,
    )?;

    write_outputs(&result, &app.result_path, app.csv_path.as_deref())?;
    print_summary(&result, &app.result_path);
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cli::SearchArgs;
    use hierdock::workflows::result::DockResult;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    /// A four-residue strand along x, 3.8 apart.
    pub(crate) fn write_strand(path: &Path, ss: char) {
        let mut csv = String::from("resi,resn,ss,atom,x,y,z\n");
        for i in 0..4 {
            csv.push_str(&format!("{},ALA,{},CA,{:.1},0.0,0.0\n", i + 1, ss, 3.8 * i as f32));
        }
        fs::write(path, csv).unwrap();
    }

    pub(crate) fn write_flat_score(path: &Path) {
        let ones = vec!["1.0"; 64].join(", ");
        let table = format!(
            "cart-resl = 2.0\nori-resl = 30.0\n\n\
             [[levels]]\nmax-pair-dist = 16.0\nbin-width = 1.0\n[levels.pairs]\nEE = [{ones}]\n\n\
             [[levels]]\nmax-pair-dist = 8.0\nbin-width = 1.0\n[levels.pairs]\nEE = [{ones}]\n"
        );
        fs::write(path, table).unwrap();
    }

    #[test]
    fn cyclic_command_writes_result_csv_and_models() {
        let dir = tempdir().unwrap();
        let body = dir.path().join("mono.csv");
        let score = dir.path().join("score.toml");
        let output = dir.path().join("result.toml");
        let csv = dir.path().join("result.csv");
        write_strand(&body, 'E');
        write_flat_score(&score);

        let prefix = dir.path().join("c3").to_string_lossy().to_string();
        let args = CyclicArgs {
            body,
            sym: "C3".to_string(),
            search: SearchArgs {
                score,
                output: output.clone(),
                csv: Some(csv.clone()),
                beam_size: Some(1280),
                max_cluster: Some(3),
                nout_debug: Some(1),
                output_prefix: Some(prefix.clone()),
                ..Default::default()
            },
        };
        run(args, false).unwrap();

        let result = DockResult::load(&output).unwrap();
        assert_eq!(result.provenance.protocol, "cyclic");
        assert_eq!(result.provenance.symmetry, "C3");
        assert_eq!(result.provenance.bodies, vec!["mono".to_string()]);
        assert!(!result.is_empty() && result.len() <= 3);

        let table = fs::read_to_string(&csv).unwrap();
        assert_eq!(table.lines().count(), result.len() + 1);
        assert!(Path::new(&format!("{prefix}_00.pdb")).exists());
    }

    #[test]
    fn cyclic_command_rejects_bad_symmetry_before_loading() {
        let dir = tempdir().unwrap();
        let args = CyclicArgs {
            body: dir.path().join("missing.csv"),
            sym: "X3".to_string(),
            search: SearchArgs {
                score: dir.path().join("missing.toml"),
                output: dir.path().join("out.toml"),
                ..Default::default()
            },
        };
        let err = run(args, false).unwrap_err();
        assert!(matches!(err, crate::error::CliError::Argument(_)));
    }
}
