use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// bundle-forge: signed update-bundle trust fixture generator.
///
/// Produces deterministic positive and negative test vectors for a device's
/// secure-software-update verifier.
#[derive(Debug, Parser)]
#[command(name = "bundle-forge", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate the fixture suite into an output directory.
    Generate(GenerateArgs),

    /// Decode a serialized bundle and print a JSON summary.
    Inspect(InspectArgs),
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Output directory for the binary fixture files.
    pub out_dir: PathBuf,

    /// Path for the generated C header. Defaults to
    /// `<out_dir>/test_bundles.h` when header emission is enabled.
    #[arg(long)]
    pub header: Option<PathBuf>,

    /// Config file override (defaults are used when omitted).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit a machine-readable generation report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct InspectArgs {
    /// Path to a serialized update bundle.
    pub bundle: PathBuf,
}
