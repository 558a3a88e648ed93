//! Filesystem helpers for the declaration-copy step

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{MonobuildError, Result};

/// Remove a directory tree if it exists.
pub fn remove_dir_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .map_err(|e| MonobuildError::io(&format!("Failed to remove {}", path.display()), &e))?;
    }
    Ok(())
}

/// Copy a directory tree into `dst`, creating directories as needed.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|e| MonobuildError::IoError {
            message: format!("Failed to walk {}: {e}", src.display()),
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| MonobuildError::IoError {
                message: format!("Failed to relativize {}: {e}", entry.path().display()),
            })?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| {
                MonobuildError::io(&format!("Failed to create {}", target.display()), &e)
            })?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    MonobuildError::io(&format!("Failed to create {}", parent.display()), &e)
                })?;
            }
            fs::copy(entry.path(), &target).map_err(|e| {
                MonobuildError::io(&format!("Failed to copy to {}", target.display()), &e)
            })?;
        }
    }
    Ok(())
}
