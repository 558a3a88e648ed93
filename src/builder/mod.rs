//! Build orchestration across workspaces
//!
//! One invocation runs: optional type check over the whole project, then one
//! bundler compilation per selected workspace, strictly in discovery order.
//! Builds are sequential on purpose: the declaration-copy and dist-clearing
//! steps must not race across workspaces, and callers get deterministic
//! reported ordering. The first failing workspace aborts the run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::bundler::{
    Bundler, CompileRequest, ModuleFormat, OutputTarget, Platform, WorkspaceResolver,
};
use crate::config::BuildConfig;
use crate::error::{MonobuildError, Result};
use crate::fsops;
use crate::tsconfig::{self, TsConfig};
use crate::typecheck::TypeChecker;
use crate::workspace::{self, DIST_DIR, SOURCE_GLOB, Workspace, select::select};

/// Per-invocation build options from the command line
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Positional workspace name substrings; empty selects all
    pub name_filters: Vec<String>,
    /// Rebuild on source file changes
    pub watch: bool,
    /// Skip generating types even when a tsconfig exists
    pub skip_types: bool,
}

/// Sequences type generation and per-workspace builds.
pub struct BuildOrchestrator<'a> {
    bundler: &'a dyn Bundler,
    typechecker: &'a dyn TypeChecker,
    config: BuildConfig,
    project_root: PathBuf,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(
        bundler: &'a dyn Bundler,
        typechecker: &'a dyn TypeChecker,
        config: BuildConfig,
        project_root: &Path,
    ) -> Self {
        Self {
            bundler,
            typechecker,
            config,
            project_root: project_root.to_path_buf(),
        }
    }

    pub fn run(&self, options: &BuildOptions) -> Result<()> {
        let workspaces = workspace::discover(&self.project_root)?;
        let excluded: HashSet<String> = self.config.exclude.iter().cloned().collect();
        let selected = select(&workspaces, &excluded, &options.name_filters);

        let ts_config = tsconfig::load(&self.project_root);
        let types_built = !options.skip_types && ts_config.is_some();
        if types_built {
            self.create_types()?;
        }

        if selected.is_empty() {
            println!("No workspaces selected.");
            return Ok(());
        }

        let progress = build_progress(selected.len() as u64);
        for ws in &selected {
            progress.set_message(ws.manifest.name.clone());
            if let Err(e) = self.build_workspace(ws, types_built, ts_config.as_ref(), options.watch)
            {
                progress.abandon();
                return Err(e);
            }
            progress.inc(1);
        }
        progress.finish_with_message("built");

        if options.watch {
            println!("{} watching for changes", style("→").cyan());
            self.bundler.wait()?;
        }
        Ok(())
    }

    /// Run the type checker once, synchronously, against the whole project.
    fn create_types(&self) -> Result<()> {
        let started = Instant::now();
        match self.typechecker.check(&self.project_root) {
            Ok(()) => {
                println!(
                    "{} types built in {}ms",
                    style("✓").green(),
                    started.elapsed().as_millis()
                );
                Ok(())
            }
            Err(e) => {
                eprintln!("{} type checking failed", style("✗").red());
                Err(e)
            }
        }
    }

    fn build_workspace(
        &self,
        ws: &Workspace,
        types_built: bool,
        ts_config: Option<&TsConfig>,
        watch: bool,
    ) -> Result<()> {
        let dir = ws.dir();
        let dist = dir.join(DIST_DIR);

        if types_built {
            fsops::remove_dir_if_exists(&dist)?;
            if let Some(ts) = ts_config {
                let declarations = self
                    .project_root
                    .join(&ts.out_dir)
                    .join(ws.location_in_types_root())
                    .join("src");
                // Declarations are best-effort: a workspace the type checker
                // produced no output for still builds.
                if declarations.is_dir() {
                    fsops::copy_dir_recursive(&declarations, &dist)?;
                }
            }
        }

        let entry_points: Vec<PathBuf> = workspace::glob_files(&dir, SOURCE_GLOB)?
            .into_iter()
            .filter(|path| !path.to_string_lossy().ends_with(".d.ts"))
            .filter_map(|path| path.strip_prefix(&dir).map(Path::to_path_buf).ok())
            .collect();

        let mut request = CompileRequest {
            entry_points,
            stdin_source: None,
            format: ModuleFormat::Esm,
            platform: Platform::Browser,
            bundle: true,
            sourcemap: true,
            watch,
            working_dir: dir,
            output: OutputTarget::Dir(PathBuf::from(DIST_DIR)),
            banner: None,
            externals: Vec::new(),
            hooks: vec![Box::new(WorkspaceResolver {
                out_extension: self.config.out_extension().to_string(),
            })],
            extra_options: crate::bundler::ExtraOptions::new(),
        };
        self.config.bundler.apply(&mut request);

        self.bundler.compile(&request).map_err(|e| match e {
            err @ MonobuildError::ToolNotFound { .. } => err,
            err => MonobuildError::BuildFailed {
                workspace: ws.manifest.name.clone(),
                reason: err.to_string(),
            },
        })
    }
}

fn build_progress(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(bar_style) = ProgressStyle::default_bar().template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        bar.set_style(bar_style.progress_chars("#>-"));
    }
    bar
}
