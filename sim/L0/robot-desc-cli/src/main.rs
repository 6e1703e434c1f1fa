//! Robot description command-line tool.
//!
//! # Commands
//!
//! - `robot-desc convert <FILE> --to mjcf|sdf` - Validate and convert a URDF
//! - `robot-desc validate <FILE>` - Run the structural checks only
//! - `robot-desc extract <FILE>` - Print the document embedded in a response
//! - `robot-desc score` - Score a finished simulation run
//!
//! `FILE` may be `-` to read standard input.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use robot_desc::{TargetFormat, Terrain};

#[derive(Parser)]
#[command(name = "robot-desc")]
#[command(about = "Extract, validate and convert URDF robot descriptions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Output schema.
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// MuJoCo MJCF
    Mjcf,
    /// Gazebo SDF 1.7
    Sdf,
}

impl From<Format> for TargetFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Mjcf => Self::Mjcf,
            Format::Sdf => Self::Sdf,
        }
    }
}

/// Structural check thresholds shared by `convert` and `validate`.
#[derive(clap::Args)]
struct Thresholds {
    /// Minimum joint origin distance (m)
    #[arg(long, default_value_t = 0.01)]
    min_joint_distance: f64,

    /// Minimum offset reported when a joint is too short (m)
    #[arg(long, default_value_t = 0.5)]
    min_offset: f64,

    /// Minimum actuator effort
    #[arg(long, default_value_t = 100.0)]
    min_effort: f64,

    /// Skip mass and inertia checks
    #[arg(long)]
    no_mass_check: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a URDF document and convert it
    Convert {
        /// Input file, or `-` for stdin
        #[arg(name = "FILE")]
        input: PathBuf,

        /// Output format
        #[arg(long, value_enum)]
        to: Format,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave visual geoms out of MJCF output
        #[arg(long)]
        no_visuals: bool,

        #[command(flatten)]
        thresholds: Thresholds,
    },

    /// Run the structural checks on a URDF document
    Validate {
        /// Input file, or `-` for stdin
        #[arg(name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        thresholds: Thresholds,
    },

    /// Print the XML document embedded in free-form text
    Extract {
        /// Input file, or `-` for stdin
        #[arg(name = "FILE")]
        input: PathBuf,

        /// Root element of the document
        #[arg(long, default_value = "robot")]
        root: String,
    },

    /// Score a finished simulation run
    Score {
        /// Distance the base travelled from its spawn point (m)
        #[arg(long)]
        displacement: f64,

        /// Cosine between the base z-axis and world up
        #[arg(long)]
        tilt_cos: f64,

        /// Final base height (m)
        #[arg(long)]
        final_z: f64,

        /// Terrain the run used
        #[arg(long, default_value = "flat")]
        terrain: Terrain,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            to,
            output,
            no_visuals,
            thresholds,
        } => commands::convert(&input, to.into(), output.as_deref(), !no_visuals, &thresholds),
        Commands::Validate { input, thresholds } => commands::validate(&input, &thresholds),
        Commands::Extract { input, root } => commands::extract(&input, &root),
        Commands::Score {
            displacement,
            tilt_cos,
            final_z,
            terrain,
        } => {
            commands::score(displacement, tilt_cos, final_z, terrain);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use robot_desc::ValidationConfig;

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(args).expect("arguments should parse").command
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_threshold_defaults_match_library() {
        let Commands::Validate { thresholds, .. } = parse(&["robot-desc", "validate", "r.urdf"])
        else {
            panic!("expected validate");
        };
        assert_eq!(thresholds.config(), ValidationConfig::default());
    }

    #[test]
    fn test_threshold_flags_reach_config() {
        let Commands::Validate { input, thresholds } = parse(&[
            "robot-desc",
            "validate",
            "r.urdf",
            "--min-effort",
            "50",
            "--min-joint-distance",
            "0.02",
            "--min-offset",
            "0.25",
            "--no-mass-check",
        ]) else {
            panic!("expected validate");
        };
        assert_eq!(input, PathBuf::from("r.urdf"));

        let config = thresholds.config();
        assert!((config.min_effort - 50.0).abs() < 1e-12);
        assert!((config.min_joint_distance - 0.02).abs() < 1e-12);
        assert!((config.min_offset - 0.25).abs() < 1e-12);
        assert!(!config.check_mass_properties);
    }

    #[test]
    fn test_convert_flags() {
        let Commands::Convert {
            input,
            to,
            output,
            no_visuals,
            thresholds,
        } = parse(&[
            "robot-desc",
            "convert",
            "-",
            "--to",
            "sdf",
            "-o",
            "out.sdf",
            "--no-visuals",
        ])
        else {
            panic!("expected convert");
        };
        assert_eq!(input, PathBuf::from("-"));
        assert_eq!(TargetFormat::from(to), TargetFormat::Sdf);
        assert_eq!(output, Some(PathBuf::from("out.sdf")));
        assert!(no_visuals);
        assert!(thresholds.config().check_mass_properties);

        assert!(Cli::try_parse_from(["robot-desc", "convert", "r.urdf"]).is_err());
        assert!(Cli::try_parse_from(["robot-desc", "convert", "r.urdf", "--to", "urdf"]).is_err());
    }

    #[test]
    fn test_score_terrain_parsing() {
        let base = [
            "robot-desc",
            "score",
            "--displacement",
            "0.1",
            "--tilt-cos",
            "0.9",
            "--final-z",
            "0.2",
        ];

        let Commands::Score { terrain, .. } = parse(&base) else {
            panic!("expected score");
        };
        assert_eq!(terrain, Terrain::Flat);

        let mut args = base.to_vec();
        args.extend(["--terrain", "STAIRS"]);
        let Commands::Score {
            displacement,
            terrain,
            ..
        } = parse(&args)
        else {
            panic!("expected score");
        };
        assert_eq!(terrain, Terrain::Stairs);
        assert!((displacement - 0.1).abs() < 1e-12);

        let mut args = base.to_vec();
        args.extend(["--terrain", "lava"]);
        assert!(Cli::try_parse_from(args).is_err());
    }
}
