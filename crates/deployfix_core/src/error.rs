//! Error types for the auto-fix engine.

use thiserror::Error;

/// Result type alias for fix operations.
pub type FixResult<T> = Result<T, FixError>;

/// Errors that can occur while applying an automatic fix.
///
/// Expected conditions such as a missing Dockerfile or an already-patched
/// file are not errors; they surface as `changed = false` outcomes. Only
/// unexpected I/O failures (permissions, disk) land here.
#[derive(Error, Debug)]
pub enum FixError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
