//! # deployfix_core
//!
//! Deployment-log triage and local auto-fix engine.
//!
//! This crate provides:
//! - **Issue Registry**: Known deployment failure signatures with optional
//!   automatic remediation
//! - **Log Classifier**: Match raw deployment log text against the registry
//!   and a generic error/success tier
//! - **Auto-Fix Applier**: Apply idempotent Dockerfile patches for the
//!   fixable subset of detected issues
//!
//! ## Example
//!
//! ```rust,ignore
//! use deployfix_core::{apply_known_auto_fixes, IssueRegistry, LogAnalyzer};
//! use std::path::Path;
//!
//! let registry = IssueRegistry::builtin();
//! let analyzer = LogAnalyzer::new(&registry);
//!
//! let analysis = analyzer.analyze(log_text);
//! if analysis.has_errors {
//!     let ids = analysis.issues.iter().map(|issue| issue.id.as_str());
//!     let report = apply_known_auto_fixes(&registry, Path::new("./my-app"), ids);
//!     println!("applied {} fixes", report.applied.len());
//! }
//! ```

pub mod analyzer;
pub mod applier;
pub mod error;
pub mod fixes;
pub mod loglines;
pub mod registry;

pub use analyzer::{AnalysisResult, DetectedIssue, LogAnalyzer};
pub use applier::{apply_known_auto_fixes, AppliedFix, FailedFix, FixReport, SkippedFix};
pub use error::{FixError, FixResult};
pub use fixes::FixOutcome;
pub use loglines::extract_latest_log_lines;
pub use registry::{IssueDefinition, IssueRegistry, PatchFn, Remediation};
