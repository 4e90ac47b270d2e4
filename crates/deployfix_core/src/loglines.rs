//! Log-line display helpers.

use crate::registry::builtin_pattern;

const TIMESTAMP_PREFIX: &str = r"^\[\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\]";

/// Extract the trailing `count` timestamped lines from raw log text.
///
/// Only lines starting with a `[YYYY-MM-DD HH:MM:SS]` stamp qualify; they
/// are trimmed and returned in source order. Used for compact operator
/// display of the most recent activity in a noisy log dialog.
pub fn extract_latest_log_lines(text: &str, count: usize) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }

    let stamp = builtin_pattern(TIMESTAMP_PREFIX);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| stamp.is_match(line))
        .collect();

    lines[lines.len().saturating_sub(count)..]
        .iter()
        .map(ToString::to_string)
        .collect()
}
