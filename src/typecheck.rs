//! Type checker collaborator
//!
//! The type checker runs as an external process against the whole project,
//! sharing the caller's standard streams, and blocks the orchestrator for its
//! full duration. It is modeled as a trait so orchestration can be tested
//! against fakes.

use std::path::Path;
use std::process::Command;

use crate::error::{MonobuildError, Result};
use crate::tools;

/// Name of the type checker binary looked up on PATH
pub const TSC_BINARY: &str = "tsc";

/// Narrow type-checker interface: check the project rooted at `project_root`.
pub trait TypeChecker {
    fn check(&self, project_root: &Path) -> Result<()>;
}

/// Production type checker invoking `tsc` as a subprocess.
#[derive(Debug, Default)]
pub struct Tsc;

impl Tsc {
    pub fn new() -> Self {
        Tsc
    }
}

impl TypeChecker for Tsc {
    fn check(&self, project_root: &Path) -> Result<()> {
        // Located lazily so a --skip-types run never requires the binary.
        let binary = tools::require_binary(TSC_BINARY)?;
        let status = Command::new(&binary)
            .current_dir(project_root)
            .status()
            .map_err(|e| MonobuildError::io("Failed to run tsc", &e))?;

        if status.success() {
            Ok(())
        } else {
            Err(MonobuildError::TypeCheckFailed)
        }
    }
}
