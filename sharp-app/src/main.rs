//! Sharp to XYZ
//!
//! Converts Apple SHARP 3D Gaussian Splatting PLY files to XYZ point clouds.
//!
//! Usage:
//! - `sharp-to-xyz input.ply` converts one file next to the input
//! - `sharp-to-xyz input.ply output.xyz` picks the output name
//! - `sharp-to-xyz ./ply_folder/ ./xyz_output/` converts a whole directory

mod app;

use clap::{Arg, ArgAction, CommandFactory, FromArgMatches, Parser};
use sharp_data::TypePolicy;
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  sharp-to-xyz input.ply                    # Convert single file
  sharp-to-xyz input.ply output.xyz         # Convert with custom output name
  sharp-to-xyz ./ply_folder/ ./xyz_output/  # Batch convert directory
  sharp-to-xyz input.ply -q                 # Quiet mode";

/// Convert SHARP 3DGS PLY files to XYZ point cloud format
#[derive(Parser, Debug)]
#[command(name = "sharp-to-xyz")]
#[command(author, version, about, long_about = None, after_help = EXAMPLES)]
struct Args {
    /// Input PLY file or directory containing PLY files
    input: PathBuf,

    /// Output XYZ file or directory (default: same location with .xyz extension)
    output: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// Read unknown property types as float32 instead of failing
    #[arg(long)]
    lenient_types: bool,
}

impl Args {
    /// The derived command with `-v` rebound to print the version.
    fn command_with_short_version() -> clap::Command {
        Args::command().disable_version_flag(true).arg(
            Arg::new("version")
                .short('v')
                .long("version")
                .action(ArgAction::Version)
                .help("Print version"),
        )
    }

    fn parse_with_short_version() -> Self {
        let matches = Self::command_with_short_version().get_matches();
        Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }
}

fn main() {
    let args = Args::parse_with_short_version();

    let policy = if args.lenient_types {
        TypePolicy::Lenient
    } else {
        TypePolicy::Strict
    };

    let mut builder = app::AppBuilder::new(args.input)
        .with_quiet(args.quiet)
        .with_type_policy(policy);
    if let Some(output) = args.output {
        builder = builder.with_output(output);
    }

    if let Err(e) = builder.run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
