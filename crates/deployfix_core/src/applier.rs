//! Batch application of automatic fixes.
//!
//! The applier never aborts the batch: every issue id lands in exactly one
//! of the applied/skipped/failed buckets, and a failing patch is data for
//! the caller, not a reason to stop processing the rest.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::registry::{IssueRegistry, Remediation};

/// A fix that mutated the project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFix {
    pub id: String,
    pub reason: String,
    pub files: Vec<PathBuf>,
}

/// A fix that was not attempted or had nothing to do.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFix {
    pub id: String,
    pub reason: String,
}

/// A fix that hit an unexpected error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedFix {
    pub id: String,
    pub reason: String,
}

/// Three-bucket report over a batch of fix attempts.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixReport {
    pub applied: Vec<AppliedFix>,
    pub skipped: Vec<SkippedFix>,
    pub failed: Vec<FailedFix>,
}

impl FixReport {
    /// Whether the batch produced no outcomes at all.
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Apply the registered automatic fix for each unique issue id.
///
/// Ids are deduplicated in first-occurrence order so that the same issue
/// detected across repeated log polls is only patched once. Unknown ids are
/// skipped rather than rejected: they can legitimately originate from
/// detectors the local registry does not know about.
pub fn apply_known_auto_fixes<I, S>(
    registry: &IssueRegistry,
    project_path: &Path,
    issue_ids: I,
) -> FixReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut report = FixReport::default();

    for id in issue_ids {
        let id = id.as_ref();
        if id.is_empty() || !seen.insert(id.to_string()) {
            continue;
        }

        let Some(issue) = registry.get(id) else {
            debug!("Skipping unknown issue id: {}", id);
            report.skipped.push(SkippedFix {
                id: id.to_string(),
                reason: "Unknown issue id.".to_string(),
            });
            continue;
        };

        match &issue.remediation {
            Remediation::InfoOnly => {
                report.skipped.push(SkippedFix {
                    id: id.to_string(),
                    reason: "No automatic fix available.".to_string(),
                });
            }
            Remediation::Fixable { patch } => match patch(project_path) {
                Ok(outcome) if outcome.changed => {
                    info!("Applied fix for {}: {}", id, outcome.reason);
                    report.applied.push(AppliedFix {
                        id: id.to_string(),
                        reason: outcome.reason,
                        files: outcome.files,
                    });
                }
                Ok(outcome) => {
                    report.skipped.push(SkippedFix {
                        id: id.to_string(),
                        reason: outcome.reason,
                    });
                }
                Err(err) => {
                    warn!("Fix for {} failed: {}", id, err);
                    report.failed.push(FailedFix {
                        id: id.to_string(),
                        reason: err.to_string(),
                    });
                }
            },
        }
    }

    report
}
