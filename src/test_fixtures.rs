//! Test fixtures for scaffolding monorepos in unit tests.
//!
//! Orchestration tests need a project root with a workspaces manifest, a few
//! packages with sources, and sometimes a tsconfig and pre-generated
//! declaration output. [`MonorepoFixture`] builds that in one call.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// A scaffolded monorepo: root manifest with `packages/*` workspaces and one
/// package per given manifest name (the directory name is the part after the
/// scope separator, so `@acme/alpha` lives at `packages/alpha`).
pub struct MonorepoFixture {
    temp: TempDir,
}

impl MonorepoFixture {
    #[must_use]
    pub fn new(names: &[&str]) -> Self {
        let fixture = Self {
            temp: create_temp_dir(),
        };
        fixture.write_file(
            "package.json",
            r#"{"name": "root", "private": true, "workspaces": ["packages/*"]}"#,
        );
        for name in names {
            let short = name.rsplit('/').next().expect("non-empty name");
            fixture.write_file(
                &format!("packages/{short}/package.json"),
                &format!(r#"{{"name": "{name}"}}"#),
            );
            fixture.write_file(&format!("packages/{short}/src/index.ts"), "export {}\n");
        }
        fixture
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    #[must_use]
    pub fn workspace_dir(&self, short: &str) -> PathBuf {
        self.temp.path().join("packages").join(short)
    }

    /// Write a file (and parent directories) relative to the project root.
    pub fn write_file(&self, relative: &str, content: &str) {
        let path = self.temp.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write fixture file");
    }

    /// Add a root tsconfig.json with the given declaration output root.
    pub fn add_tsconfig(&self, out_dir: &str) {
        self.write_file(
            "tsconfig.json",
            &format!(r#"{{"compilerOptions": {{"outDir": "{out_dir}", "declaration": true}}}}"#),
        );
    }

    pub fn file_exists(&self, relative: &str) -> bool {
        self.temp.path().join(relative).exists()
    }
}
