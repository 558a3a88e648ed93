//! Production bundler driving esbuild
//!
//! Resolution hooks need esbuild's plugin API, which only exists in its
//! JavaScript entry point: when a hook supplies plugin source, the adapter
//! writes a short build script around `esbuild.build` (or `esbuild.context`
//! for watch mode) and runs it with `node`, so hook decisions — including the
//! extension rewrite on relative imports — apply to real compilations exactly
//! as they do in tests. Without plugin-bearing hooks, or without a `node`
//! runtime, esbuild runs as a plain CLI subprocess with each hook's
//! command-line approximation from [`ResolveHook::flags`](super::ResolveHook::flags).
//!
//! Watch-mode compilations are spawned without waiting so the orchestrator
//! can start watchers for every workspace; `wait` then blocks indefinitely,
//! keeping the process alive until external termination.

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use serde_json::{Value, json};
use tempfile::TempPath;

use crate::error::{MonobuildError, Result};
use crate::tools;

use super::{Bundler, CompileRequest, ExtraOptions, OutputTarget, Platform};

/// Name of the bundler binary looked up on PATH
pub const ESBUILD_BINARY: &str = "esbuild";

struct Watcher {
    child: Child,
    /// Keeps the generated build script on disk while the watcher runs
    _script: Option<TempPath>,
}

/// Bundler implementation spawning esbuild as a subprocess.
#[derive(Default)]
pub struct EsbuildCli {
    watch_children: RefCell<Vec<Watcher>>,
}

impl EsbuildCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Command-line rendering of a request for the plain CLI path.
    fn cli_args(request: &CompileRequest) -> Vec<String> {
        let mut args = Vec::new();
        if request.bundle {
            args.push("--bundle".to_string());
        }
        args.push(format!("--format={}", request.format.as_str()));
        if request.platform == Platform::Node {
            args.push("--platform=node".to_string());
        }
        if request.sourcemap {
            args.push("--sourcemap".to_string());
        }
        match &request.output {
            OutputTarget::Dir(dir) => args.push(format!("--outdir={}", dir.display())),
            OutputTarget::File(file) => args.push(format!("--outfile={}", file.display())),
        }
        if let Some(banner) = &request.banner {
            args.push(format!("--banner:js={banner}"));
        }
        for external in &request.externals {
            args.push(format!("--external:{external}"));
        }
        for hook in &request.hooks {
            args.extend(hook.flags());
        }
        if request.watch {
            args.push("--watch".to_string());
        }
        // Overrides come after the derived flags; esbuild lets later flags win.
        args.extend(extra_option_flags(&request.extra_options));

        if let Some(stdin) = &request.stdin_source {
            args.push(format!("--sourcefile={}", stdin.sourcefile));
        }
        for entry in &request.entry_points {
            args.push(entry.to_string_lossy().into_owned());
        }
        args
    }

    fn command(request: &CompileRequest) -> Result<Command> {
        let binary = tools::require_binary(ESBUILD_BINARY)?;
        let mut cmd = Command::new(binary);
        cmd.current_dir(&request.working_dir);
        cmd.args(Self::cli_args(request));
        if request.stdin_source.is_some() {
            cmd.stdin(Stdio::piped());
        }
        Ok(cmd)
    }

    /// Program text of the generated build script for the plugin path.
    fn build_script(request: &CompileRequest, plugins: &[String]) -> Result<String> {
        let mut options = serde_json::Map::new();
        options.insert("bundle".to_string(), request.bundle.into());
        options.insert("format".to_string(), request.format.as_str().into());
        if request.platform == Platform::Node {
            options.insert("platform".to_string(), "node".into());
        }
        options.insert("sourcemap".to_string(), request.sourcemap.into());
        options.insert(
            "absWorkingDir".to_string(),
            path_string(&request.working_dir).into(),
        );
        match &request.output {
            OutputTarget::Dir(dir) => {
                options.insert("outdir".to_string(), path_string(dir).into());
            }
            OutputTarget::File(file) => {
                options.insert("outfile".to_string(), path_string(file).into());
            }
        }
        if !request.entry_points.is_empty() {
            options.insert(
                "entryPoints".to_string(),
                Value::Array(
                    request
                        .entry_points
                        .iter()
                        .map(|entry| path_string(entry).into())
                        .collect(),
                ),
            );
        }
        if let Some(stdin) = &request.stdin_source {
            options.insert(
                "stdin".to_string(),
                json!({
                    "contents": stdin.contents,
                    "sourcefile": stdin.sourcefile,
                    "resolveDir": path_string(&request.working_dir),
                }),
            );
        }
        if let Some(banner) = &request.banner {
            options.insert("banner".to_string(), json!({ "js": banner }));
        }
        if !request.externals.is_empty() {
            options.insert(
                "external".to_string(),
                Value::Array(
                    request
                        .externals
                        .iter()
                        .map(|name| name.as_str().into())
                        .collect(),
                ),
            );
        }
        // Caller overrides replace matching defaults.
        for (key, value) in &request.extra_options {
            options.insert(key.clone(), value.clone());
        }
        let options_json = serde_json::to_string_pretty(&Value::Object(options)).map_err(|e| {
            MonobuildError::BundlerFailed {
                reason: format!("Failed to encode build options: {e}"),
            }
        })?;

        let mut script = String::new();
        if request.watch {
            script.push_str("import {context} from 'esbuild'\n");
        } else {
            script.push_str("import {build} from 'esbuild'\n");
        }
        script.push_str(&format!("const options = {options_json}\n"));
        script.push_str(&format!("options.plugins = [{}]\n", plugins.join(", ")));
        if request.watch {
            script.push_str("const ctx = await context(options)\nawait ctx.watch()\n");
        } else {
            script.push_str("await build(options)\n");
        }
        Ok(script)
    }

    fn compile_with_script(
        &self,
        node: &Path,
        request: &CompileRequest,
        plugins: &[String],
    ) -> Result<()> {
        let script = Self::build_script(request, plugins)?;
        // The script lives next to the sources so node resolves the esbuild
        // package from the project's node_modules.
        let file = tempfile::Builder::new()
            .prefix(".monobuild-build-")
            .suffix(".mjs")
            .tempfile_in(&request.working_dir)
            .map_err(|e| MonobuildError::io("Failed to create build script", &e))?;
        fs::write(file.path(), &script)
            .map_err(|e| MonobuildError::io("Failed to write build script", &e))?;

        let mut child = Command::new(node)
            .arg(file.path())
            .current_dir(&request.working_dir)
            .spawn()
            .map_err(|e| MonobuildError::io("Failed to run node", &e))?;

        if request.watch {
            self.watch_children.borrow_mut().push(Watcher {
                child,
                _script: Some(file.into_temp_path()),
            });
            return Ok(());
        }

        let status = child
            .wait()
            .map_err(|e| MonobuildError::io("Failed to wait for esbuild", &e))?;
        if status.success() {
            Ok(())
        } else {
            Err(MonobuildError::BundlerFailed {
                reason: format!("esbuild exited with {status}"),
            })
        }
    }

    fn compile_with_cli(&self, request: &CompileRequest) -> Result<()> {
        let mut cmd = Self::command(request)?;
        let mut child = cmd
            .spawn()
            .map_err(|e| MonobuildError::io("Failed to run esbuild", &e))?;

        if let (Some(stdin), Some(pipe)) = (&request.stdin_source, child.stdin.take()) {
            let mut pipe = pipe;
            pipe.write_all(stdin.contents.as_bytes())
                .map_err(|e| MonobuildError::io("Failed to write esbuild stdin", &e))?;
            // Closing the pipe lets esbuild see end of input.
        }

        if request.watch {
            self.watch_children.borrow_mut().push(Watcher {
                child,
                _script: None,
            });
            return Ok(());
        }

        let status = child
            .wait()
            .map_err(|e| MonobuildError::io("Failed to wait for esbuild", &e))?;
        if status.success() {
            Ok(())
        } else {
            Err(MonobuildError::BundlerFailed {
                reason: format!("esbuild exited with {status}"),
            })
        }
    }
}

impl Bundler for EsbuildCli {
    fn compile(&self, request: &CompileRequest) -> Result<()> {
        let plugins: Vec<String> = request.hooks.iter().filter_map(|h| h.plugin()).collect();
        if !plugins.is_empty() {
            if let Some(node) = tools::locate_binary(tools::NODE_BINARY) {
                return self.compile_with_script(&node, request, &plugins);
            }
            // No runtime for the plugin path; fall back to the flag
            // approximation.
        }
        self.compile_with_cli(request)
    }

    fn wait(&self) -> Result<()> {
        let watchers = std::mem::take(&mut *self.watch_children.borrow_mut());
        for mut watcher in watchers {
            let status = watcher
                .child
                .wait()
                .map_err(|e| MonobuildError::io("Failed to wait for esbuild", &e))?;
            if !status.success() {
                return Err(MonobuildError::BundlerFailed {
                    reason: format!("esbuild watcher exited with {status}"),
                });
            }
        }
        Ok(())
    }
}

fn extra_option_flags(options: &ExtraOptions) -> Vec<String> {
    options
        .iter()
        .map(|(key, value)| {
            let flag = kebab_case(key);
            match value {
                Value::Bool(true) => format!("--{flag}"),
                Value::String(text) => format!("--{flag}={text}"),
                other => format!("--{flag}={other}"),
            }
        })
        .collect()
}

fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{ModuleFormat, WorkspaceResolver};
    use std::path::PathBuf;

    fn request() -> CompileRequest {
        let mut extra_options = ExtraOptions::new();
        extra_options.insert("target".to_string(), json!("es2020"));
        CompileRequest {
            entry_points: vec![PathBuf::from("src/index.ts")],
            stdin_source: None,
            format: ModuleFormat::Esm,
            platform: Platform::Browser,
            bundle: true,
            sourcemap: true,
            watch: false,
            working_dir: PathBuf::from("."),
            output: OutputTarget::Dir(PathBuf::from("dist")),
            banner: None,
            externals: vec!["react".to_string()],
            hooks: vec![Box::new(WorkspaceResolver {
                out_extension: ".js".to_string(),
            })],
            extra_options,
        }
    }

    #[test]
    fn test_cli_args_flag_order() {
        let args = EsbuildCli::cli_args(&request());
        assert!(args.contains(&"--bundle".to_string()));
        assert!(args.contains(&"--format=esm".to_string()));
        assert!(args.contains(&"--sourcemap".to_string()));
        assert!(args.contains(&"--outdir=dist".to_string()));
        assert!(args.contains(&"--external:react".to_string()));
        assert!(args.contains(&"--packages=external".to_string()));
        // Overrides come after the derived flags.
        let target = args.iter().position(|a| a == "--target=es2020").unwrap();
        let outdir = args.iter().position(|a| a == "--outdir=dist").unwrap();
        assert!(target > outdir);
        // Entry points come last.
        assert_eq!(args.last().map(String::as_str), Some("src/index.ts"));
    }

    #[test]
    fn test_cli_args_banner() {
        let mut req = request();
        req.banner = Some("console.log('hi')".to_string());
        let args = EsbuildCli::cli_args(&req);
        assert!(args.contains(&"--banner:js=console.log('hi')".to_string()));
    }

    #[test]
    fn test_extra_option_flags_translate_to_kebab_case() {
        let mut options = ExtraOptions::new();
        options.insert("minify".to_string(), json!(true));
        options.insert("logLevel".to_string(), json!("info"));
        assert_eq!(
            extra_option_flags(&options),
            vec!["--log-level=info".to_string(), "--minify".to_string()]
        );
    }

    #[test]
    fn test_build_script_carries_plugins_and_rewrite() {
        let req = request();
        let plugins: Vec<String> = req.hooks.iter().filter_map(|h| h.plugin()).collect();
        assert_eq!(plugins.len(), 1);
        let script = EsbuildCli::build_script(&req, &plugins).unwrap();
        assert!(script.starts_with("import {build} from 'esbuild'"));
        assert!(script.contains("\"outdir\": \"dist\""));
        assert!(script.contains("\"absWorkingDir\""));
        assert!(script.contains("options.plugins = [{"));
        // The plugin keeps the extension rewrite on relative imports.
        assert!(script.contains("args.path + ext"));
        assert!(script.ends_with("await build(options)\n"));
    }

    #[test]
    fn test_build_script_overrides_replace_defaults() {
        let mut req = request();
        req.extra_options
            .insert("sourcemap".to_string(), json!(false));
        let script = EsbuildCli::build_script(&req, &[]).unwrap();
        assert!(script.contains("\"sourcemap\": false"));
        assert!(!script.contains("\"sourcemap\": true"));
    }

    #[test]
    fn test_build_script_watch_uses_context() {
        let mut req = request();
        req.watch = true;
        let script = EsbuildCli::build_script(&req, &[]).unwrap();
        assert!(script.starts_with("import {context} from 'esbuild'"));
        assert!(script.ends_with("await ctx.watch()\n"));
    }

    #[test]
    fn test_build_script_embeds_stdin_and_banner() {
        let mut req = request();
        req.entry_points.clear();
        req.stdin_source = Some(crate::bundler::StdinSource {
            contents: "await import('uvu')\n".to_string(),
            sourcefile: "bootstrap.js".to_string(),
        });
        req.banner = Some("process.argv.push('x')".to_string());
        let script = EsbuildCli::build_script(&req, &[]).unwrap();
        assert!(script.contains("\"sourcefile\": \"bootstrap.js\""));
        assert!(script.contains("\"resolveDir\""));
        assert!(script.contains("\"banner\""));
        assert!(script.contains("process.argv.push('x')"));
    }

    #[test]
    fn test_missing_binary_is_configuration_error() {
        if tools::locate_binary(ESBUILD_BINARY).is_some() {
            return;
        }
        let err = EsbuildCli::command(&request()).unwrap_err();
        assert!(matches!(err, MonobuildError::ToolNotFound { .. }));
    }
}
