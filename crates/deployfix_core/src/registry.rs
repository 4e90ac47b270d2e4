//! Known-issue registry.
//!
//! The registry is an immutable list of deployment failure signatures built
//! once at startup and passed by reference into both the log analyzer and
//! the fix applier. Issue ids are the contract between the two: the analyzer
//! reports them, the applier resolves them back to patch functions.

use std::path::Path;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::FixResult;
use crate::fixes::{self, FixOutcome};

/// Signature of an automatic fix.
///
/// A patch receives the project root and rewrites the build configuration
/// file in place. Missing files and nothing-to-change are normal
/// `changed = false` outcomes, not errors.
pub type PatchFn = fn(&Path) -> FixResult<FixOutcome>;

/// How a known issue can be remediated.
#[derive(Debug, Clone)]
pub enum Remediation {
    /// A local automatic fix exists for this issue.
    Fixable { patch: PatchFn },
    /// The issue can only be reported, with hints for manual remediation.
    InfoOnly,
}

/// A known deployment failure signature.
#[derive(Debug, Clone)]
pub struct IssueDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pattern: Regex,
    /// Remediation suggestions shown to the operator regardless of fixability.
    pub hints: &'static [&'static str],
    pub remediation: Remediation,
}

impl IssueDefinition {
    /// Create an auto-fixable issue definition.
    pub fn fixable(
        id: &'static str,
        title: &'static str,
        pattern: Regex,
        hints: &'static [&'static str],
        patch: PatchFn,
    ) -> Self {
        Self {
            id,
            title,
            pattern,
            hints,
            remediation: Remediation::Fixable { patch },
        }
    }

    /// Create an issue definition that is reported but never patched.
    pub fn info_only(
        id: &'static str,
        title: &'static str,
        pattern: Regex,
        hints: &'static [&'static str],
    ) -> Self {
        Self {
            id,
            title,
            pattern,
            hints,
            remediation: Remediation::InfoOnly,
        }
    }

    /// Whether this issue carries an automatic fix.
    pub fn auto_fixable(&self) -> bool {
        matches!(self.remediation, Remediation::Fixable { .. })
    }

    /// Test the issue signature against a piece of log text.
    ///
    /// Membership is decided on the whole text so multi-line signatures
    /// still match; line extraction reuses the same pattern per line.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// The compiled signature pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

/// A registry of known issue definitions.
#[derive(Debug, Clone, Default)]
pub struct IssueRegistry {
    issues: Vec<IssueDefinition>,
}

impl IssueRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// The builtin registry of known deployment issues.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry.register(IssueDefinition::fixable(
            "docker-entrypoint-not-found",
            "docker-entrypoint.sh not found",
            builtin_pattern(r"docker-entrypoint\.sh:\s*not found"),
            &[
                "Use absolute ENTRYPOINT path, for example /usr/local/bin/docker-entrypoint.sh.",
                r"Normalize line endings to LF in Docker build (sed -i 's/\r$//' ...).",
            ],
            fixes::fix_docker_entrypoint_not_found,
        ));

        registry.register(IssueDefinition::fixable(
            "corepack-registry-timeout",
            "Corepack/pnpm registry network issue",
            builtin_pattern(
                r"(corepack is about to download|registry\.npmjs\.org|pnpm-\d+.*\.tgz|ERR_PNPM_FETCH|ECONNRESET|ETIMEDOUT)",
            ),
            &[
                "Set npm/corepack registry mirror in Dockerfile when build env cannot access npmjs reliably.",
                "Example mirror: https://registry.npmmirror.com",
            ],
            fixes::fix_corepack_registry_mirror,
        ));

        registry.register(IssueDefinition::info_only(
            "vite-router-base-path",
            "Vite/Router base path mismatch",
            builtin_pattern(r"(Failed to load resource.*404|Cannot\s+GET\s+/app/|route.*not\s+matched)"),
            &[
                "Set Vite base to './' for relative asset paths.",
                "If using BrowserRouter under sub-path, configure basename.",
            ],
        ));

        registry
    }

    /// Register an issue definition.
    pub fn register(&mut self, issue: IssueDefinition) {
        debug!("Registering issue: {}", issue.id);
        self.issues.push(issue);
    }

    /// Get an issue definition by id.
    pub fn get(&self, id: &str) -> Option<&IssueDefinition> {
        self.issues.iter().find(|issue| issue.id == id)
    }

    /// Iterate over all issue definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &IssueDefinition> {
        self.issues.iter()
    }

    /// All registered issue ids.
    pub fn ids(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.id).collect()
    }

    /// Number of registered issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Compile a case-insensitive pattern owned by this crate.
///
/// Only called with literals that are covered by tests, hence the expect.
pub(crate) fn builtin_pattern(source: &str) -> Regex {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .expect("builtin pattern must compile")
}
