//! Lookup of external tool binaries on PATH
//!
//! The bundler, type checker, and artifact runner are all external programs.
//! Locating them up front lets callers fail fast with a configuration error
//! instead of a raw spawn failure mid-run.

use std::env;
use std::path::PathBuf;

use crate::error::{MonobuildError, Result};

/// Name of the JavaScript runtime binary looked up on PATH
pub const NODE_BINARY: &str = "node";

/// Find a binary on PATH. On Windows also tries the usual executable
/// extensions, since npm installs tools as `.cmd` shims.
pub fn locate_binary(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    for dir in env::split_paths(&path_var) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        for candidate in candidates(name) {
            let full = dir.join(&candidate);
            if full.is_file() {
                return Some(full);
            }
        }
    }
    None
}

/// Like [`locate_binary`], but absence is a fatal configuration error.
pub fn require_binary(name: &str) -> Result<PathBuf> {
    locate_binary(name).ok_or_else(|| MonobuildError::ToolNotFound {
        tool: name.to_string(),
    })
}

#[cfg(windows)]
fn candidates(name: &str) -> Vec<String> {
    vec![
        format!("{name}.exe"),
        format!("{name}.cmd"),
        format!("{name}.bat"),
        name.to_string(),
    ]
}

#[cfg(not(windows))]
fn candidates(name: &str) -> Vec<String> {
    vec![name.to_string()]
}
