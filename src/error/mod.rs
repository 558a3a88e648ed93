//! Error types and handling for Monobuild
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! The taxonomy follows the orchestration flow: configuration errors (a required
//! external tool is missing) fail fast before any build work; type-check and
//! per-workspace build errors are fatal and stop the run; a failing aggregated
//! test run is reported after artifact cleanup. Errors surface unhandled to the
//! command layer, which translates them into a non-zero exit.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Monobuild operations
#[derive(Error, Diagnostic, Debug)]
pub enum MonobuildError {
    // Configuration errors
    #[error("No {tool} binary found, is it installed?")]
    #[diagnostic(
        code(monobuild::tool::not_found),
        help("The {tool} binary must be available on PATH")
    )]
    ToolNotFound { tool: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(monobuild::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(
        code(monobuild::config::parse_failed),
        help("Check the YAML syntax of monobuild.yaml")
    )]
    ConfigParseFailed { path: String, reason: String },

    // Workspace/manifest errors
    #[error("Failed to read manifest: {path}")]
    #[diagnostic(
        code(monobuild::manifest::read_failed),
        help("Every workspace needs a package.json with at least a name field")
    )]
    ManifestReadFailed { path: String, reason: String },

    #[error("Failed to parse manifest: {path}")]
    #[diagnostic(code(monobuild::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    #[diagnostic(code(monobuild::glob::invalid))]
    InvalidGlob { pattern: String, reason: String },

    // Type checking errors
    #[error("Type errors found")]
    #[diagnostic(
        code(monobuild::typecheck::failed),
        help("Fix the reported type errors, or re-run with --skip-types")
    )]
    TypeCheckFailed,

    // Bundler errors
    #[error("Bundler failed: {reason}")]
    #[diagnostic(code(monobuild::bundler::failed))]
    BundlerFailed { reason: String },

    #[error("Build failed for workspace '{workspace}': {reason}")]
    #[diagnostic(code(monobuild::build::failed))]
    BuildFailed { workspace: String, reason: String },

    // Test errors
    #[error("One or more test suites failed")]
    #[diagnostic(code(monobuild::test::suite_failed))]
    TestSuiteFailed,

    // File system errors
    #[error("IO error: {message}")]
    #[diagnostic(code(monobuild::fs::io_error))]
    IoError { message: String },
}

impl MonobuildError {
    /// Wrap an `std::io::Error` with context about the operation that failed
    pub fn io(context: &str, err: &std::io::Error) -> Self {
        MonobuildError::IoError {
            message: format!("{context}: {err}"),
        }
    }
}

/// Result type alias for Monobuild operations
pub type Result<T> = std::result::Result<T, MonobuildError>;
