//! Deployment log classification.
//!
//! The analyzer is a pure function of its input: no I/O, no side effects,
//! total over arbitrary UTF-8 text. Known-issue membership is decided on the
//! whole log so multi-line signatures match, while matched-line extraction
//! and the generic error tier work per trimmed line so noisy output stays
//! separable and cappable.

use regex::Regex;
use serde::Serialize;

use crate::registry::{builtin_pattern, IssueDefinition, IssueRegistry};

/// Matched lines kept per detected issue.
const MAX_MATCHED_LINES: usize = 4;
/// Generic error lines kept per analysis.
const MAX_GENERIC_ERROR_LINES: usize = 12;

const ERROR_LINE_PATTERN: &str =
    r"(\b(error|failed|failure|exception|traceback)\b|not found|GL_HOOK_ERR|EACCES|ENOENT|denied|invalid)";
const SUCCESS_PATTERN: &str =
    r"(deploy(ment)?\s+success|部署成功|service\s+running|服务运行中|started\s+successfully|启动成功)";

/// A known issue detected in a deployment log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedIssue {
    pub id: String,
    pub title: String,
    pub auto_fixable: bool,
    pub hints: Vec<String>,
    /// Raw log lines that matched the signature, in source order.
    pub matched_lines: Vec<String>,
}

/// Structured verdict over a deployment log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub has_errors: bool,
    pub success_detected: bool,
    pub issues: Vec<DetectedIssue>,
    pub generic_error_lines: Vec<String>,
}

impl AnalysisResult {
    /// The verdict for a log with no findings at all.
    pub fn clean() -> Self {
        Self {
            has_errors: false,
            success_detected: false,
            issues: Vec::new(),
            generic_error_lines: Vec::new(),
        }
    }
}

/// Classifies deployment log text against a registry of known issues.
pub struct LogAnalyzer<'a> {
    registry: &'a IssueRegistry,
    error_line: Regex,
    success: Regex,
}

impl<'a> LogAnalyzer<'a> {
    /// Create an analyzer over the given registry.
    pub fn new(registry: &'a IssueRegistry) -> Self {
        Self {
            registry,
            error_line: builtin_pattern(ERROR_LINE_PATTERN),
            success: builtin_pattern(SUCCESS_PATTERN),
        }
    }

    /// Analyze raw deployment log text.
    ///
    /// Success and error detection are computed independently; both flags
    /// can be true at once when the upstream state is ambiguous. A line that
    /// matches both a known-issue signature and the generic error pattern is
    /// surfaced in both tiers.
    pub fn analyze(&self, log_text: &str) -> AnalysisResult {
        let issues: Vec<DetectedIssue> = self
            .registry
            .iter()
            .filter(|issue| issue.matches(log_text))
            .map(|issue| detect(issue, log_text))
            .collect();

        let generic_error_lines: Vec<String> = non_empty_lines(log_text)
            .filter(|line| self.error_line.is_match(line))
            .take(MAX_GENERIC_ERROR_LINES)
            .map(ToString::to_string)
            .collect();

        AnalysisResult {
            has_errors: !issues.is_empty() || !generic_error_lines.is_empty(),
            success_detected: self.success.is_match(log_text),
            issues,
            generic_error_lines,
        }
    }
}

fn detect(issue: &IssueDefinition, log_text: &str) -> DetectedIssue {
    DetectedIssue {
        id: issue.id.to_string(),
        title: issue.title.to_string(),
        auto_fixable: issue.auto_fixable(),
        hints: issue.hints.iter().map(ToString::to_string).collect(),
        matched_lines: non_empty_lines(log_text)
            .filter(|line| issue.pattern().is_match(line))
            .take(MAX_MATCHED_LINES)
            .map(ToString::to_string)
            .collect(),
    }
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}
