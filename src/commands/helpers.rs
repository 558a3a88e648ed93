//! Shared helpers for command implementations

use std::path::PathBuf;

use crate::error::{MonobuildError, Result};

/// Resolve the project root from the global --cwd flag or the current
/// directory. Canonicalized so workspace locations stay stable relative
/// paths.
pub fn project_root(cwd: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match cwd {
        Some(path) => path,
        None => std::env::current_dir().map_err(|e| MonobuildError::IoError {
            message: format!("Failed to get current directory: {e}"),
        })?,
    };
    dunce::canonicalize(&dir).map_err(|e| {
        MonobuildError::io(&format!("Failed to resolve project root {}", dir.display()), &e)
    })
}
