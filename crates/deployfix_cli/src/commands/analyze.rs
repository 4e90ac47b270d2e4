//! Analyze command - Classify a deployment log.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use tracing::info;

use deployfix_core::{extract_latest_log_lines, AnalysisResult, IssueRegistry, LogAnalyzer};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to a deployment log file (reads stdin when omitted or "-")
    log_file: Option<PathBuf>,

    /// Print the full analysis as JSON
    #[arg(long)]
    json: bool,

    /// Write a timestamped JSON report to this path
    #[arg(long, value_name = "PATH")]
    output_json: Option<PathBuf>,

    /// Also print the trailing N timestamped log lines
    #[arg(long, value_name = "N")]
    latest: Option<usize>,

    /// Exit non-zero when the log contains errors
    #[arg(long)]
    fail_on_errors: bool,
}

/// JSON envelope written by `--output-json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisReport<'a> {
    generated_at: DateTime<Utc>,
    source: String,
    analysis: &'a AnalysisResult,
}

pub fn execute(args: AnalyzeArgs) -> Result<()> {
    let log_text = read_log(args.log_file.as_deref())?;

    let registry = IssueRegistry::builtin();
    let analysis = LogAnalyzer::new(&registry).analyze(&log_text);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_analysis(&analysis);
        if let Some(count) = args.latest {
            let lines = extract_latest_log_lines(&log_text, count);
            if !lines.is_empty() {
                println!("Latest log lines:");
                for line in &lines {
                    println!("- {}", line);
                }
            }
        }
    }

    if let Some(path) = &args.output_json {
        let report = AnalysisReport {
            generated_at: Utc::now(),
            source: source_name(args.log_file.as_deref()),
            analysis: &analysis,
        };
        fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!("Wrote analysis report to {}", path.display());
    }

    if args.fail_on_errors && analysis.has_errors {
        anyhow::bail!("deployment log contains errors");
    }

    Ok(())
}

fn read_log(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => fs::read_to_string(p)
            .with_context(|| format!("failed to read log file {}", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read log from stdin")?;
            Ok(buf)
        }
    }
}

fn source_name(path: Option<&Path>) -> String {
    match path {
        Some(p) if p != Path::new("-") => p.display().to_string(),
        _ => "stdin".to_string(),
    }
}

fn print_analysis(analysis: &AnalysisResult) {
    if analysis.success_detected {
        println!("✅ Success marker detected in deployment log");
    }

    if !analysis.has_errors {
        if !analysis.success_detected {
            println!("No known issues or error lines detected.");
        }
        return;
    }

    if !analysis.issues.is_empty() {
        println!("Detected known deployment issues:");
        for issue in &analysis.issues {
            println!("- [{}] {}", issue.id, issue.title);
            for line in issue.matched_lines.iter().take(2) {
                println!("  log: {}", line);
            }
            for hint in &issue.hints {
                println!("  hint: {}", hint);
            }
        }
    }

    if !analysis.generic_error_lines.is_empty() {
        println!("Error-like lines from deployment log:");
        for line in analysis.generic_error_lines.iter().take(5) {
            println!("- {}", line);
        }
    }
}
