//! Dockerfile patch functions for the auto-fixable issues.
//!
//! Patches are line-oriented text surgery, not Dockerfile parsing: the
//! format has no stable schema worth modeling. Every patch is idempotent
//! and compares the rewritten content against the original, skipping the
//! write entirely when nothing changed.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::error::FixResult;

/// Canonical install location for the entrypoint script inside the image.
pub const ENTRYPOINT_INSTALL_PATH: &str = "/usr/local/bin/docker-entrypoint.sh";

/// CRLF normalization and permission command inserted by the entrypoint fix.
const NORMALIZE_LINE: &str = r"RUN sed -i 's/\r$//' /usr/local/bin/docker-entrypoint.sh && chmod +x /usr/local/bin/docker-entrypoint.sh";

/// Registry mirror reachable from build environments that cannot see npmjs.
const REGISTRY_MIRROR: &str = "https://registry.npmmirror.com";

/// Outcome of a single fix attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixOutcome {
    pub changed: bool,
    pub reason: String,
    pub files: Vec<PathBuf>,
}

impl FixOutcome {
    /// A no-op outcome with an explanatory reason.
    pub fn unchanged(reason: impl Into<String>) -> Self {
        Self {
            changed: false,
            reason: reason.into(),
            files: Vec::new(),
        }
    }

    /// An outcome reporting mutated files.
    pub fn applied(reason: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            changed: true,
            reason: reason.into(),
            files,
        }
    }
}

/// Fix for `docker-entrypoint-not-found`.
///
/// Rewrites relative `ENTRYPOINT ["docker-entrypoint.sh"]` directives to the
/// absolute install path and inserts a CRLF-normalization-and-chmod command
/// next to the line that copies the script into the image. The root cause is
/// usually a CRLF-corrupted script or an ENTRYPOINT resolved against an
/// unexpected working directory.
pub fn fix_docker_entrypoint_not_found(project_path: &Path) -> FixResult<FixOutcome> {
    let dockerfile = project_path.join("Dockerfile");
    if !dockerfile.exists() {
        return Ok(FixOutcome::unchanged(format!(
            "Dockerfile not found at {}",
            dockerfile.display()
        )));
    }

    let original = normalize_lf(&fs::read_to_string(&dockerfile)?);

    let mut updated = fix_pattern(r#"ENTRYPOINT\s*\[\s*["']docker-entrypoint\.sh["']\s*\]"#)
        .replace_all(
            &original,
            r#"ENTRYPOINT ["/usr/local/bin/docker-entrypoint.sh"]"#,
        )
        .into_owned();

    if fix_pattern(r"(?i)docker-entrypoint\.sh").is_match(&updated)
        && !updated.contains(NORMALIZE_LINE)
    {
        updated = insert_normalize_line(&updated);
    }

    if updated == original {
        return Ok(FixOutcome::unchanged(
            "Dockerfile already looks compatible with entrypoint requirements.",
        ));
    }

    fs::write(&dockerfile, &updated)?;
    info!("Patched {} for the entrypoint path issue", dockerfile.display());
    Ok(FixOutcome::applied(
        "Updated ENTRYPOINT and added CRLF normalization for docker-entrypoint.sh.",
        vec![dockerfile],
    ))
}

/// Insert the normalization command at the best anchor.
///
/// Preferred anchor is directly after the COPY line that installs the
/// script; fallback is directly before the ENTRYPOINT line; last resort is
/// appending at end of file.
fn insert_normalize_line(content: &str) -> String {
    if let Some(found) = fix_pattern(r"(?m)^.*COPY[^\n]*docker-entrypoint\.sh[^\n]*$").find(content)
    {
        let mut out = String::with_capacity(content.len() + NORMALIZE_LINE.len() + 1);
        out.push_str(&content[..found.end()]);
        out.push('\n');
        out.push_str(NORMALIZE_LINE);
        out.push_str(&content[found.end()..]);
        return out;
    }

    if let Some(found) = fix_pattern(r"(?m)^.*ENTRYPOINT[^\n]*$").find(content) {
        let mut out = String::with_capacity(content.len() + NORMALIZE_LINE.len() + 1);
        out.push_str(&content[..found.start()]);
        out.push_str(NORMALIZE_LINE);
        out.push('\n');
        out.push_str(&content[found.start()..]);
        return out;
    }

    format!("{}\n{}\n", content.trim_end(), NORMALIZE_LINE)
}

/// Fix for `corepack-registry-timeout`.
///
/// Injects registry-mirror environment variables for corepack and npm right
/// after a leading FROM line. No-ops when the Dockerfile never invokes
/// corepack or when a mirror is already configured.
pub fn fix_corepack_registry_mirror(project_path: &Path) -> FixResult<FixOutcome> {
    let dockerfile = project_path.join("Dockerfile");
    if !dockerfile.exists() {
        return Ok(FixOutcome::unchanged(format!(
            "Dockerfile not found at {}",
            dockerfile.display()
        )));
    }

    let original = normalize_lf(&fs::read_to_string(&dockerfile)?);

    if !fix_pattern(r"(?i)corepack").is_match(&original) {
        return Ok(FixOutcome::unchanged(
            "No corepack usage detected in Dockerfile.",
        ));
    }

    if fix_pattern(r"(?i)COREPACK_NPM_REGISTRY|npm_config_registry").is_match(&original) {
        return Ok(FixOutcome::unchanged("Registry mirror already configured."));
    }

    let mirror_env = format!(
        "ENV COREPACK_NPM_REGISTRY={mirror} \\\n    npm_config_registry={mirror}\n",
        mirror = REGISTRY_MIRROR
    );

    // Without (?m), ^ anchors at the start of the file: the env lines only
    // slot in after FROM when FROM is the very first line.
    let updated = match fix_pattern(r"(?i)^FROM[^\n]*\n").find(&original) {
        Some(found) => format!(
            "{}{}{}",
            &original[..found.end()],
            mirror_env,
            &original[found.end()..]
        ),
        None => format!("{}{}", mirror_env, original),
    };

    fs::write(&dockerfile, &updated)?;
    info!("Patched {} with a registry mirror", dockerfile.display());
    Ok(FixOutcome::applied(
        "Added corepack/npm registry mirror config.",
        vec![dockerfile],
    ))
}

fn normalize_lf(content: &str) -> String {
    content.replace("\r\n", "\n")
}

/// Compile a pattern owned by this module. Literals only, hence the expect.
fn fix_pattern(source: &str) -> Regex {
    Regex::new(source).expect("builtin fix pattern must compile")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_dockerfile(dir: &Path, lines: &[&str]) -> PathBuf {
        let path = dir.join("Dockerfile");
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn entrypoint_fix_rewrites_path_and_inserts_normalization_after_copy() {
        let temp = tempdir().unwrap();
        let path = write_dockerfile(
            temp.path(),
            &[
                "FROM python:3.10-slim",
                "WORKDIR /app",
                "COPY docker-entrypoint.sh /usr/local/bin/docker-entrypoint.sh",
                r#"ENTRYPOINT ["docker-entrypoint.sh"]"#,
                r#"CMD ["python", "app.py"]"#,
                "",
            ],
        );

        let outcome = fix_docker_entrypoint_not_found(temp.path()).unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.files, vec![path.clone()]);

        let updated = fs::read_to_string(&path).unwrap();
        assert!(updated.contains(r#"ENTRYPOINT ["/usr/local/bin/docker-entrypoint.sh"]"#));

        let lines: Vec<&str> = updated.lines().collect();
        let copy_index = lines
            .iter()
            .position(|line| line.starts_with("COPY docker-entrypoint.sh"))
            .unwrap();
        assert_eq!(lines[copy_index + 1], NORMALIZE_LINE);
    }

    #[test]
    fn entrypoint_fix_is_idempotent() {
        let temp = tempdir().unwrap();
        let path = write_dockerfile(
            temp.path(),
            &[
                "FROM node:20-alpine",
                "COPY docker-entrypoint.sh /usr/local/bin/docker-entrypoint.sh",
                r#"ENTRYPOINT ["docker-entrypoint.sh"]"#,
                "",
            ],
        );

        let first = fix_docker_entrypoint_not_found(temp.path()).unwrap();
        assert!(first.changed);
        let after_first = fs::read_to_string(&path).unwrap();

        let second = fix_docker_entrypoint_not_found(temp.path()).unwrap();
        assert!(!second.changed);
        assert!(second.files.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
        assert_eq!(after_first.matches(NORMALIZE_LINE).count(), 1);
    }

    #[test]
    fn entrypoint_fix_reports_missing_dockerfile_without_writing() {
        let temp = tempdir().unwrap();

        let outcome = fix_docker_entrypoint_not_found(temp.path()).unwrap();
        assert!(!outcome.changed);
        assert!(outcome.reason.contains("Dockerfile not found at"));
        assert!(outcome
            .reason
            .contains(&temp.path().join("Dockerfile").display().to_string()));
        assert!(!temp.path().join("Dockerfile").exists());
    }

    #[test]
    fn entrypoint_fix_falls_back_to_inserting_before_entrypoint() {
        let temp = tempdir().unwrap();
        let path = write_dockerfile(
            temp.path(),
            &[
                "FROM node:20-alpine",
                r#"ENTRYPOINT ["docker-entrypoint.sh"]"#,
                "",
            ],
        );

        fix_docker_entrypoint_not_found(temp.path()).unwrap();

        let lines: Vec<String> = fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(ToString::to_string)
            .collect();
        let norm_index = lines.iter().position(|line| line == NORMALIZE_LINE).unwrap();
        assert!(lines[norm_index + 1].starts_with("ENTRYPOINT"));
    }

    #[test]
    fn entrypoint_fix_appends_when_no_anchor_exists() {
        let temp = tempdir().unwrap();
        let path = write_dockerfile(
            temp.path(),
            &["FROM alpine", "RUN ./docker-entrypoint.sh --check", ""],
        );

        let outcome = fix_docker_entrypoint_not_found(temp.path()).unwrap();
        assert!(outcome.changed);

        let updated = fs::read_to_string(&path).unwrap();
        assert!(updated.ends_with(&format!("{}\n", NORMALIZE_LINE)));
    }

    #[test]
    fn entrypoint_fix_normalizes_crlf_content() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("Dockerfile");
        fs::write(
            &path,
            "FROM alpine\r\nCOPY docker-entrypoint.sh /usr/local/bin/docker-entrypoint.sh\r\nENTRYPOINT [\"docker-entrypoint.sh\"]\r\n",
        )
        .unwrap();

        let outcome = fix_docker_entrypoint_not_found(temp.path()).unwrap();
        assert!(outcome.changed);
        assert!(!fs::read_to_string(&path).unwrap().contains('\r'));
    }

    #[test]
    fn corepack_fix_skips_when_corepack_is_absent() {
        let temp = tempdir().unwrap();
        write_dockerfile(temp.path(), &["FROM alpine", r#"CMD ["sh"]"#, ""]);

        let outcome = fix_corepack_registry_mirror(temp.path()).unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.reason, "No corepack usage detected in Dockerfile.");
    }

    #[test]
    fn corepack_fix_injects_mirror_after_leading_from() {
        let temp = tempdir().unwrap();
        let path = write_dockerfile(
            temp.path(),
            &[
                "FROM node:20-alpine",
                "RUN corepack enable",
                r#"CMD ["pnpm", "start"]"#,
                "",
            ],
        );

        let outcome = fix_corepack_registry_mirror(temp.path()).unwrap();
        assert!(outcome.changed);

        let lines: Vec<String> = fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(ToString::to_string)
            .collect();
        assert!(lines[0].starts_with("FROM"));
        assert_eq!(
            lines[1],
            format!("ENV COREPACK_NPM_REGISTRY={} \\", REGISTRY_MIRROR)
        );
        assert_eq!(lines[2], format!("    npm_config_registry={}", REGISTRY_MIRROR));
    }

    #[test]
    fn corepack_fix_is_idempotent_once_mirror_is_configured() {
        let temp = tempdir().unwrap();
        write_dockerfile(
            temp.path(),
            &["FROM node:20-alpine", "RUN corepack enable", ""],
        );

        let first = fix_corepack_registry_mirror(temp.path()).unwrap();
        assert!(first.changed);

        let second = fix_corepack_registry_mirror(temp.path()).unwrap();
        assert!(!second.changed);
        assert_eq!(second.reason, "Registry mirror already configured.");
    }

    #[test]
    fn corepack_fix_prepends_when_file_does_not_start_with_from() {
        let temp = tempdir().unwrap();
        let path = write_dockerfile(
            temp.path(),
            &["# build image", "RUN corepack enable", ""],
        );

        let outcome = fix_corepack_registry_mirror(temp.path()).unwrap();
        assert!(outcome.changed);
        assert!(fs::read_to_string(&path)
            .unwrap()
            .starts_with("ENV COREPACK_NPM_REGISTRY="));
    }
}
