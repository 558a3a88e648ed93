//! Aggregate test runs
//!
//! Test modules discovered across all workspaces are compiled into one
//! self-contained artifact together with a synthesized bootstrap, executed
//! exactly once as a subprocess, and the artifact is removed on every exit
//! path. Discovery order is load-bearing: the bootstrap registers and loads
//! suites strictly one at a time in that order, so suite indices and names
//! are reproducible across runs on unchanged input.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::bundler::{
    Bundler, CompileRequest, ModuleFormat, OutputTarget, Platform, StaticSources, StdinSource,
};
use crate::error::{MonobuildError, Result};
use crate::tools;
use crate::workspace::{self, TEST_GLOB, Workspace};

/// Default basename filter for test discovery
pub const DEFAULT_PATTERN: &str = "test";

/// Prepended to the compiled artifact. The pushed marker makes the suite
/// runner treat this process as its own command-line entry point, so a
/// failing run ends the process with a non-zero exit code instead of merely
/// resolving with a summary.
pub const CLI_MARKER_BANNER: &str =
    "import \"data:text/javascript,process.argv.push('.bin/uvu')\"";

/// One discovered test module; ordering is significant end-to-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestModule {
    pub path: PathBuf,
    pub basename: String,
    /// Position in discovery order
    pub index: usize,
}

/// Runs a compiled aggregate artifact once. Returns whether the suites
/// passed. Modeled as a trait for the same reason as the bundler and type
/// checker: orchestration is tested against fakes.
pub trait Runner {
    fn run(&self, artifact: &Path) -> Result<bool>;
}

/// Production runner invoking `node` with inherited standard streams.
#[derive(Debug, Default)]
pub struct NodeRunner;

impl NodeRunner {
    pub fn new() -> Self {
        NodeRunner
    }
}

impl Runner for NodeRunner {
    fn run(&self, artifact: &Path) -> Result<bool> {
        let binary = tools::require_binary(tools::NODE_BINARY)?;
        let status = Command::new(&binary)
            .arg(artifact)
            .status()
            .map_err(|e| MonobuildError::io("Failed to run node", &e))?;
        Ok(status.success())
    }
}

/// Discover test modules across workspaces. Each workspace's test convention
/// path is globbed; basenames are matched case-insensitively against
/// `pattern`; per-workspace and within-workspace order is preserved.
pub fn discover(workspaces: &[Workspace], pattern: &str) -> Result<Vec<TestModule>> {
    let filter = pattern.to_lowercase();
    let mut modules = Vec::new();
    for ws in workspaces {
        for path in workspace::glob_files(&ws.dir(), TEST_GLOB)? {
            let Some(basename) = path.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            if !basename.to_lowercase().contains(&filter) {
                continue;
            }
            modules.push(TestModule {
                path,
                basename,
                index: modules.len(),
            });
        }
    }
    Ok(modules)
}

/// Synthesize the bootstrap program. Each module in order gets a directive
/// tagging its suite placeholder with the discovery index and basename,
/// followed by a load of the module; loads are awaited one at a time, and the
/// run directive executes only after the last load completes.
pub fn synthesize(modules: &[TestModule], project_root: &Path) -> String {
    let mut program = String::new();
    // One registry per artifact; the loader-visible bindings are bridged from
    // it, so no state outlives this invocation. The bindings must exist
    // before uvu loads: uvu adopts whatever UVU_QUEUE already holds at module
    // init, and everything registered afterwards lands in that same array.
    program.push_str("const registry = {index: 0, queue: []}\n");
    program.push_str("globalThis.UVU_DEFER = 1\n");
    program.push_str("globalThis.UVU_QUEUE = registry.queue\n");
    program.push_str("const {exec} = await import('uvu')\n");
    for module in modules {
        program.push_str(&format!("registry.index = {}\n", module.index));
        program.push_str("globalThis.UVU_INDEX = registry.index\n");
        program.push_str(&format!(
            "registry.queue.push([{}])\n",
            json_string(&module.basename)
        ));
        program.push_str(&format!(
            "await import({})\n",
            json_string(&import_specifier(&module.path, project_root))
        ));
    }
    program.push_str(
        "exec().catch(error => {\n  console.error(error.stack || error.message)\n  process.exit(1)\n})\n",
    );
    program
}

fn import_specifier(path: &Path, project_root: &Path) -> String {
    let relative = path.strip_prefix(project_root).unwrap_or(path);
    format!("./{}", relative.to_string_lossy().replace('\\', "/"))
}

fn json_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

/// Package names under `node_modules`, left external so the artifact keeps
/// importing installed dependencies through the runtime loader.
pub fn find_node_modules(project_root: &Path) -> Vec<String> {
    let dir = project_root.join("node_modules");
    let mut names = Vec::new();
    let Ok(entries) = fs::read_dir(&dir) else {
        return names;
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        if name.starts_with('@') {
            if let Ok(scoped) = fs::read_dir(entry.path()) {
                for child in scoped.flatten() {
                    if child.path().is_dir() {
                        names.push(format!("{}/{}", name, child.file_name().to_string_lossy()));
                    }
                }
            }
        } else {
            names.push(name);
        }
    }
    names.sort();
    names
}

/// Discovers test modules, compiles the aggregate artifact, runs it once,
/// and removes it afterwards.
pub struct TestBundleAssembler<'a> {
    bundler: &'a dyn Bundler,
    runner: &'a dyn Runner,
    project_root: PathBuf,
}

impl<'a> TestBundleAssembler<'a> {
    pub fn new(bundler: &'a dyn Bundler, runner: &'a dyn Runner, project_root: &Path) -> Self {
        Self {
            bundler,
            runner,
            project_root: project_root.to_path_buf(),
        }
    }

    pub fn run(&self, pattern: Option<&str>) -> Result<()> {
        let filter = pattern.unwrap_or(DEFAULT_PATTERN).to_lowercase();
        let workspaces = workspace::discover(&self.project_root)?;
        let modules = discover(&workspaces, &filter)?;
        if modules.is_empty() {
            println!("No tests found for pattern \"{filter}\"");
            return Ok(());
        }

        let bootstrap = synthesize(&modules, &self.project_root);

        let scratch = self.project_root.join("node_modules");
        fs::create_dir_all(&scratch)
            .map_err(|e| MonobuildError::io("Failed to create scratch directory", &e))?;
        // The tempfile handle owns the artifact: whatever path returns below,
        // dropping it removes the file.
        let artifact = tempfile::Builder::new()
            .prefix(".monobuild-")
            .suffix(".mjs")
            .tempfile_in(&scratch)
            .map_err(|e| MonobuildError::io("Failed to create artifact file", &e))?;
        let artifact_path = artifact.path().to_path_buf();

        let request = CompileRequest {
            entry_points: Vec::new(),
            stdin_source: Some(StdinSource {
                contents: bootstrap,
                sourcefile: "monobuild-test.js".to_string(),
            }),
            format: ModuleFormat::Esm,
            platform: Platform::Node,
            bundle: true,
            sourcemap: false,
            watch: false,
            working_dir: self.project_root.clone(),
            output: OutputTarget::File(artifact_path.clone()),
            banner: Some(CLI_MARKER_BANNER.to_string()),
            externals: find_node_modules(&self.project_root),
            hooks: vec![Box::new(StaticSources {
                sources: modules.iter().map(|m| m.path.clone()).collect(),
            })],
            extra_options: crate::bundler::ExtraOptions::new(),
        };
        // A compile failure propagates unmodified.
        self.bundler.compile(&request)?;

        let outcome = self.runner.run(&artifact_path);
        drop(artifact);
        if outcome? {
            Ok(())
        } else {
            Err(MonobuildError::TestSuiteFailed)
        }
    }
}
