//! Common test utilities for Monobuild integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// A scaffolded monorepo for integration tests
#[allow(dead_code)]
pub struct TestRepo {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the project root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestRepo {
    /// Create a new empty project root (no manifest yet)
    pub fn empty() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Create a project root with a workspaces manifest and the given packages
    pub fn with_packages(names: &[&str]) -> Self {
        let repo = Self::empty();
        repo.write_file(
            "package.json",
            r#"{"name": "root", "private": true, "workspaces": ["packages/*"]}"#,
        );
        for name in names {
            let short = name.rsplit('/').next().expect("non-empty name");
            repo.write_file(
                &format!("packages/{short}/package.json"),
                &format!(r#"{{"name": "{name}"}}"#),
            );
            repo.write_file(&format!("packages/{short}/src/index.ts"), "export {}\n");
        }
        repo
    }

    /// Write a file in the repo
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the repo
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }
}
