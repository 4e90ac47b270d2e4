//! CLI command definitions.
//!
//! Each subcommand maps to one entry point of the triage engine: `analyze`
//! classifies a deployment log, `fix` applies local auto-fixes.

use clap::{Parser, Subcommand};

pub mod analyze;
pub mod fix;

/// deployfix - deployment log triage and local auto-fix
#[derive(Parser)]
#[command(name = "deployfix")]
#[command(version, about = "deployfix - deployment log triage and local auto-fix")]
#[command(long_about = r#"
deployfix classifies free-text deployment logs against a registry of known
failure signatures and applies idempotent Dockerfile patches for the subset
of issues that can be fixed locally.

WORKFLOWS:
  analyze  → Classify a deployment log (known issues, error lines, success)
  fix      → Apply local auto-fixes for detected or named issue ids

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Deployment log gate failure (--fail-on-errors)
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a deployment log for known issues and error lines
    Analyze(analyze::AnalyzeArgs),

    /// Apply local auto-fixes to a project directory
    Fix(fix::FixArgs),
}
