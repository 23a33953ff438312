use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "hierdock developers",
    version,
    about = "hierdock CLI - hierarchical beam search over rigid-body placements for protein docking.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dock a monomer into the hole of a cyclic oligomer.
    Plug(PlugArgs),
    /// Assemble a monomer into a cyclic oligomer.
    Cyclic(CyclicArgs),
    /// Assemble two or three cyclic components into a tetrahedral, octahedral or icosahedral cage.
    Cage(CageArgs),
}

/// Arguments for the `plug` subcommand.
#[derive(Args, Debug)]
pub struct PlugArgs {
    /// Residue CSV of the plug monomer.
    #[arg(long, required = true, value_name = "PATH")]
    pub plug: PathBuf,

    /// Residue CSV of the complete hole oligomer, centered on the z axis.
    #[arg(long, required = true, value_name = "PATH")]
    pub hole: PathBuf,

    /// Cyclic symmetry of the hole (e.g., 'C3').
    #[arg(short = 'y', long = "hole-sym", required = true, value_name = "SYM")]
    pub hole_sym: String,

    /// Hold the plug oligomer fixed: skip its self-clash check and self-interface score.
    #[arg(long)]
    pub fixed_olig: bool,

    #[command(flatten)]
    pub search: SearchArgs,
}

/// Arguments for the `cyclic` subcommand.
#[derive(Args, Debug)]
pub struct CyclicArgs {
    /// Residue CSV of the monomer.
    #[arg(long, required = true, value_name = "PATH")]
    pub body: PathBuf,

    /// Cyclic symmetry of the oligomer to build (e.g., 'C3').
    #[arg(short = 'y', long, required = true, value_name = "SYM")]
    pub sym: String,

    #[command(flatten)]
    pub search: SearchArgs,
}

/// Arguments for the `cage` subcommand.
#[derive(Args, Debug)]
pub struct CageArgs {
    /// Cage architecture: point group then component folds (e.g., 'T33', 'I53', 'O432').
    #[arg(short = 'a', long, required = true, value_name = "ARCH")]
    pub arch: String,

    /// Residue CSV of each component's monomer, in architecture order.
    #[arg(long = "body", required = true, num_args = 1.., value_name = "PATH")]
    pub bodies: Vec<PathBuf>,

    /// Trim direction of each component ('N', 'C' or 'NC'), in body order.
    #[arg(long, num_args = 1.., value_name = "DIR")]
    pub trim_directions: Vec<String>,

    /// Letters of the components that may be trimmed (e.g., 'AB').
    #[arg(long, value_name = "LETTERS")]
    pub trimmable_components: Option<String>,

    /// Largest allowed difference between the slide offsets of two components.
    #[arg(long, value_name = "DIST")]
    pub max_delta_h: Option<f32>,

    #[command(flatten)]
    pub search: SearchArgs,
}

/// Options shared by every docking protocol.
#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// Path to the hierarchical score table in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub score: PathBuf,

    /// Path for the result table (TOML).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Also write a flat per-model score table (CSV).
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Search Overrides ---
    /// Override the number of candidates evaluated per level.
    #[arg(short = 'b', long, value_name = "INT")]
    pub beam_size: Option<usize>,

    /// Override the number of resolution levels to search.
    #[arg(long, value_name = "INT")]
    pub nresl: Option<usize>,

    /// Override the maximum number of residues that may be trimmed.
    #[arg(long, value_name = "INT")]
    pub max_trim: Option<usize>,

    /// Override the termini trimming may remove residues from ('N', 'C' or 'NC').
    #[arg(long, value_name = "DIR")]
    pub trim_direction: Option<String>,

    /// Override the number of models kept after redundancy filtering (0 keeps all).
    #[arg(long, value_name = "INT")]
    pub max_cluster: Option<usize>,

    // --- Output Overrides ---
    /// Override the number of top models written as PDB files.
    #[arg(short = 'n', long, value_name = "INT")]
    pub nout_debug: Option<usize>,

    /// Override the number of top-scoring models written as PDB files.
    #[arg(long, value_name = "INT")]
    pub nout_top: Option<usize>,

    /// Override the file name prefix of the PDB files.
    #[arg(long, value_name = "PREFIX")]
    pub output_prefix: Option<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S search.clash-dist=3.0
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_plug_command_with_overrides() {
        let cli = Cli::try_parse_from([
            "hierdock", "-vv", "plug", "--plug", "p.csv", "--hole", "h.csv", "-y", "C3", "-s",
            "score.toml", "-o", "out.toml", "-b", "640", "-S", "search.max-trim=2",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Plug(args) = cli.command else {
            panic!("expected plug command");
        };
        assert_eq!(args.hole_sym, "C3");
        assert!(!args.fixed_olig);
        assert_eq!(args.search.beam_size, Some(640));
        assert_eq!(args.search.set_values, vec!["search.max-trim=2".to_string()]);
    }

    #[test]
    fn parses_cage_command_with_several_bodies() {
        let cli = Cli::try_parse_from([
            "hierdock", "cage", "-a", "T33", "--body", "a.csv", "b.csv", "--trim-directions",
            "C", "NC", "--trimmable-components", "AB", "-s", "score.toml", "-o", "out.toml",
            "--nout-top", "4",
        ])
        .unwrap();
        let Commands::Cage(args) = cli.command else {
            panic!("expected cage command");
        };
        assert_eq!(args.arch, "T33");
        assert_eq!(args.bodies.len(), 2);
        assert_eq!(args.trim_directions, vec!["C".to_string(), "NC".to_string()]);
        assert_eq!(args.trimmable_components.as_deref(), Some("AB"));
        assert_eq!(args.search.nout_top, Some(4));
    }

    #[test]
    fn cyclic_requires_symmetry() {
        let err = Cli::try_parse_from([
            "hierdock", "cyclic", "--body", "m.csv", "-s", "score.toml", "-o", "out.toml",
        ]);
        assert!(err.is_err());
    }
}
