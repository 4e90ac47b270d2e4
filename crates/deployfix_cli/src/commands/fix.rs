//! Fix command - Apply local auto-fixes to a project directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use deployfix_core::{apply_known_auto_fixes, FixReport, IssueRegistry, LogAnalyzer};

#[derive(Args)]
pub struct FixArgs {
    /// Project directory containing the Dockerfile
    #[arg(short, long)]
    project: PathBuf,

    /// Issue id to fix (repeatable)
    #[arg(short, long = "issue", value_name = "ID")]
    issues: Vec<String>,

    /// Detect issue ids from this deployment log file before fixing
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Print the fix report as JSON
    #[arg(long)]
    json: bool,
}

pub fn execute(args: FixArgs) -> Result<()> {
    if !args.project.is_dir() {
        anyhow::bail!("Project directory not found: {}", args.project.display());
    }

    let registry = IssueRegistry::builtin();

    let mut issue_ids = args.issues.clone();
    if let Some(log_path) = &args.log {
        let log_text = fs::read_to_string(log_path)
            .with_context(|| format!("failed to read log file {}", log_path.display()))?;
        let analysis = LogAnalyzer::new(&registry).analyze(&log_text);
        info!(
            "Detected {} known issue(s) from {}",
            analysis.issues.len(),
            log_path.display()
        );
        issue_ids.extend(analysis.issues.into_iter().map(|issue| issue.id));
    }

    if issue_ids.is_empty() {
        anyhow::bail!("No issue ids to fix. Use the --issue or --log option.");
    }

    let report = apply_known_auto_fixes(&registry, &args.project, &issue_ids);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &FixReport) {
    if !report.applied.is_empty() {
        println!("Applied local auto fixes:");
        for item in &report.applied {
            println!("- {}: {}", item.id, item.reason);
            for file in &item.files {
                println!("  file: {}", file.display());
            }
        }
        println!("Re-run the deployment to pick up the fixed files.");
    }

    if !report.skipped.is_empty() {
        println!("Skipped fixes:");
        for item in &report.skipped {
            println!("- {}: {}", item.id, item.reason);
        }
    }

    if !report.failed.is_empty() {
        println!("Failed fixes:");
        for item in &report.failed {
            println!("- {}: {}", item.id, item.reason);
        }
    }

    if report.is_empty() {
        println!("Nothing to fix.");
    }
}
