//! Bundler collaborator interface
//!
//! The bundler is modeled as a narrow trait so the orchestration logic can be
//! exercised against fakes, independent of any real bundler behavior. A
//! [`CompileRequest`] carries everything one compilation needs: entry points or
//! literal program text, module format, output target, and an ordered list of
//! resolution hooks consulted for every import before default resolution.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::resolve::{self, ImportKind, ResolveContext, Resolution};

pub mod esbuild;

/// Output module format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    Esm,
    Cjs,
    Iife,
}

impl ModuleFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleFormat::Esm => "esm",
            ModuleFormat::Cjs => "cjs",
            ModuleFormat::Iife => "iife",
        }
    }
}

/// Target platform for the compiled output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Browser,
    Node,
}

/// Literal program text compiled in place of a file on disk
#[derive(Debug, Clone)]
pub struct StdinSource {
    pub contents: String,
    /// Name used in error messages and source maps
    pub sourcefile: String,
}

/// Where compiled output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// One output file per entry point under this directory
    Dir(PathBuf),
    /// A single output file
    File(PathBuf),
}

/// Context handed to resolution hooks alongside the specifier
#[derive(Debug, Clone, Copy)]
pub struct ImportContext<'a> {
    pub kind: ImportKind,
    /// Path of the importing module, if any
    #[allow(dead_code)]
    pub importer: Option<&'a str>,
    /// Directory relative specifiers are resolved against
    pub resolve_dir: &'a Path,
}

/// A hook's override of default resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookDecision {
    /// Leave the import external under this specifier
    External(String),
    /// Inline this already-resolved file literally
    Inline(PathBuf),
}

/// A resolution hook consulted for each import, in order, before default
/// resolution. Returning `None` passes the import on.
pub trait ResolveHook {
    fn name(&self) -> &'static str;

    fn resolve(&self, specifier: &str, ctx: &ImportContext) -> Option<HookDecision>;

    /// JavaScript expression evaluating to an esbuild plugin with the same
    /// behavior as `resolve`, for driving esbuild through its plugin-capable
    /// API. `None` when default resolution already matches.
    fn plugin(&self) -> Option<String> {
        None
    }

    /// Command-line flags that approximate this hook when the bundler can
    /// only be driven as a plain CLI subprocess.
    fn flags(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Free-form bundler options merged into the compilation, keyed by the
/// bundler's own option names
pub type ExtraOptions = serde_json::Map<String, serde_json::Value>;

/// One compilation request
pub struct CompileRequest {
    pub entry_points: Vec<PathBuf>,
    pub stdin_source: Option<StdinSource>,
    pub format: ModuleFormat,
    pub platform: Platform,
    pub bundle: bool,
    pub sourcemap: bool,
    pub watch: bool,
    /// Working directory for the compilation; relative entry points and
    /// stdin imports resolve against it
    pub working_dir: PathBuf,
    pub output: OutputTarget,
    /// Raw program text prepended to the output before anything else runs
    pub banner: Option<String>,
    /// Modules left external by name (in addition to hook decisions)
    pub externals: Vec<String>,
    pub hooks: Vec<Box<dyn ResolveHook>>,
    /// Caller overrides merged in last; they win on conflict
    pub extra_options: ExtraOptions,
}

impl CompileRequest {
    /// Run the request's hooks against one import, first decision wins.
    #[allow(dead_code)]
    pub fn resolve_import(&self, specifier: &str, ctx: &ImportContext) -> Option<HookDecision> {
        self.hooks.iter().find_map(|hook| hook.resolve(specifier, ctx))
    }
}

/// Bundler collaborator. Compilation fails with a bundler error on any source
/// error; watch-mode compilations may return early and are joined by `wait`.
pub trait Bundler {
    fn compile(&self, request: &CompileRequest) -> Result<()>;

    /// Block until any watch-mode compilations end.
    fn wait(&self) -> Result<()> {
        Ok(())
    }
}

/// Resolution hook used for per-workspace builds: wraps the monorepo import
/// policy from [`crate::resolve`].
pub struct WorkspaceResolver {
    pub out_extension: String,
}

impl ResolveHook for WorkspaceResolver {
    fn name(&self) -> &'static str {
        "workspace-resolver"
    }

    fn resolve(&self, specifier: &str, ctx: &ImportContext) -> Option<HookDecision> {
        let decision = resolve::resolve(&ResolveContext {
            specifier,
            kind: ctx.kind,
            out_extension: &self.out_extension,
        });
        match decision {
            Resolution::Continue => None,
            Resolution::ExternalAsIs(path) | Resolution::ExternalRewritten(path) => {
                Some(HookDecision::External(path))
            }
        }
    }

    fn plugin(&self) -> Option<String> {
        let ext = serde_json::to_string(&self.out_extension)
            .unwrap_or_else(|_| "\".js\"".to_string());
        Some(format!(
            "{{
  name: 'workspace-resolver',
  setup(build) {{
    const ext = {ext}
    build.onResolve({{filter: /.*/}}, args => {{
      if (args.kind === 'entry-point') return
      if (!args.path.startsWith('.') || args.path.includes('?') || args.path.endsWith(ext)) {{
        return {{path: args.path, external: true}}
      }}
      return {{path: args.path + ext, external: true}}
    }})
  }}
}}"
        ))
    }

    fn flags(&self) -> Vec<String> {
        // Lossy CLI approximation: relative externals keep their specifier as
        // written, without the extension rewrite. Only used when the
        // plugin-capable path is unavailable.
        let mut flags = vec![
            "--packages=external".to_string(),
            "--external:./*".to_string(),
            "--external:../*".to_string(),
        ];
        if self.out_extension != ".js" {
            flags.push(format!("--out-extension:.js={}", self.out_extension));
        }
        flags
    }
}

/// Static-passthrough resolution used for the aggregate test artifact: every
/// discovered test file is a literal, already-resolved source to inline, so
/// the artifact is fully self-contained.
pub struct StaticSources {
    pub sources: Vec<PathBuf>,
}

impl ResolveHook for StaticSources {
    fn name(&self) -> &'static str {
        "static-sources"
    }

    fn resolve(&self, specifier: &str, ctx: &ImportContext) -> Option<HookDecision> {
        if !specifier.starts_with('.') {
            return None;
        }
        let absolute = ctx.resolve_dir.join(specifier.trim_start_matches("./"));
        self.sources
            .iter()
            .find(|source| source.as_path() == absolute.as_path())
            .map(|source| HookDecision::Inline(source.clone()))
    }
}
