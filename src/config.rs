//! Build configuration from monobuild.yaml
//!
//! An optional `monobuild.yaml` at the project root carries the exclusion set
//! and bundler overrides. It is read once at orchestrator construction.
//!
//! ```yaml
//! exclude:
//!   - "@acme/website"
//! bundler:
//!   format: esm
//!   sourcemap: false
//!   out_extension: ".mjs"
//!   options:
//!     target: es2020
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::bundler::{CompileRequest, ExtraOptions, ModuleFormat};
use crate::error::{MonobuildError, Result};

/// Configuration filename at the project root
pub const CONFIG_FILE: &str = "monobuild.yaml";

/// Build configuration: excluded workspaces plus bundler overrides
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Workspace manifest names never built
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Bundler option overrides; these win over the orchestrator's defaults
    #[serde(default)]
    pub bundler: BundlerOverrides,
}

/// Caller-supplied bundler option overrides
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundlerOverrides {
    pub format: Option<ModuleFormat>,
    pub sourcemap: Option<bool>,
    pub out_extension: Option<String>,
    /// Free-form bundler options merged in last, keyed by the bundler's own
    /// option names
    #[serde(default)]
    pub options: ExtraOptions,
}

impl BuildConfig {
    /// Load configuration from the project root. A missing file yields the
    /// default configuration; a present but invalid file is an error.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| MonobuildError::ConfigReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| MonobuildError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Output extension in effect, override or the `.js` default.
    pub fn out_extension(&self) -> &str {
        self.bundler.out_extension.as_deref().unwrap_or(".js")
    }
}

impl BundlerOverrides {
    /// Apply the overrides onto an already-populated request.
    pub fn apply(&self, request: &mut CompileRequest) {
        if let Some(format) = self.format {
            request.format = format;
        }
        if let Some(sourcemap) = self.sourcemap {
            request.sourcemap = sourcemap;
        }
        for (key, value) in &self.options {
            request.extra_options.insert(key.clone(), value.clone());
        }
    }
}
