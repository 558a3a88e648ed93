//! Workspace discovery for the monorepo
//!
//! The root `package.json` lists workspace glob patterns; every matching
//! directory carrying its own `package.json` is a workspace. Discovery is
//! deterministic for identical filesystem state: patterns are processed in
//! declaration order and directory walks are sorted by file name. Downstream
//! selection and test discovery preserve this order, so it is a guarantee,
//! not an implementation detail.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;
use wax::{CandidatePath, Glob, Pattern};

use crate::error::{MonobuildError, Result};

pub mod select;

/// Workspace manifest filename
pub const MANIFEST_FILE: &str = "package.json";

/// Fixed prefix under which workspaces conventionally live; stripped when
/// mapping a workspace location into the type checker's output root
pub const PACKAGES_PREFIX: &str = "packages/";

/// Compiled output directory inside each workspace
pub const DIST_DIR: &str = "dist";

/// Source entry files per workspace
pub const SOURCE_GLOB: &str = "src/**/*.{ts,tsx}";

/// Test-file convention path per workspace
pub const TEST_GLOB: &str = "test/**/*.{ts,tsx}";

/// Parsed workspace manifest
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub name: String,
}

/// One buildable package in the monorepo
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Project root the location is relative to
    pub root: PathBuf,
    /// Relative location, forward slashes (e.g. `packages/core`)
    pub location: String,
    pub manifest: Manifest,
}

impl Workspace {
    /// Absolute directory of this workspace
    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.location)
    }

    /// Location with the fixed packages prefix removed, used to find this
    /// workspace's declaration output under the type checker's output root.
    pub fn location_in_types_root(&self) -> &str {
        self.location
            .strip_prefix(PACKAGES_PREFIX)
            .unwrap_or(&self.location)
    }
}

#[derive(Debug, Deserialize)]
struct RootManifest {
    #[serde(default)]
    workspaces: Vec<String>,
}

/// Discover all workspaces declared by the root manifest.
pub fn discover(project_root: &Path) -> Result<Vec<Workspace>> {
    let manifest_path = project_root.join(MANIFEST_FILE);
    let content =
        fs::read_to_string(&manifest_path).map_err(|e| MonobuildError::ManifestReadFailed {
            path: manifest_path.display().to_string(),
            reason: e.to_string(),
        })?;
    let root: RootManifest =
        serde_json::from_str(&content).map_err(|e| MonobuildError::ManifestParseFailed {
            path: manifest_path.display().to_string(),
            reason: e.to_string(),
        })?;

    let mut seen = BTreeSet::new();
    let mut workspaces = Vec::new();
    for pattern in &root.workspaces {
        for location in match_directories(project_root, pattern)? {
            if !seen.insert(location.clone()) {
                continue;
            }
            let dir = project_root.join(&location);
            let manifest_file = dir.join(MANIFEST_FILE);
            if !manifest_file.is_file() {
                // Directories without a manifest are not workspaces.
                continue;
            }
            let manifest = read_manifest(&manifest_file)?;
            workspaces.push(Workspace {
                root: project_root.to_path_buf(),
                location,
                manifest,
            });
        }
    }
    Ok(workspaces)
}

/// Read one workspace manifest.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path).map_err(|e| MonobuildError::ManifestReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| MonobuildError::ManifestParseFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Files under `dir` matching `pattern`, absolute paths in sorted walk order.
pub fn glob_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let glob = compile_glob(pattern)?;
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = entry.map_err(|e| MonobuildError::IoError {
            message: format!("Failed to walk {}: {e}", dir.display()),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(relative) = relative_slash_path(entry.path(), dir) {
            if glob.is_match(CandidatePath::from(relative.as_str())) {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    Ok(files)
}

fn match_directories(project_root: &Path, pattern: &str) -> Result<Vec<String>> {
    let glob = compile_glob(pattern)?;
    let mut matches = Vec::new();
    for entry in WalkDir::new(project_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = entry.map_err(|e| MonobuildError::IoError {
            message: format!("Failed to walk {}: {e}", project_root.display()),
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if let Some(relative) = relative_slash_path(entry.path(), project_root) {
            if glob.is_match(CandidatePath::from(relative.as_str())) {
                matches.push(relative);
            }
        }
    }
    Ok(matches)
}

fn compile_glob(pattern: &str) -> Result<Glob<'_>> {
    Glob::new(pattern).map_err(|e| MonobuildError::InvalidGlob {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

fn relative_slash_path(path: &Path, base: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let text = relative.to_string_lossy().replace('\\', "/");
    Some(text)
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| matches!(name, "node_modules" | "dist" | ".git"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::MonorepoFixture;

    #[test]
    fn test_discover_finds_workspaces_in_order() {
        let repo = MonorepoFixture::new(&["@acme/alpha", "@acme/beta", "@acme/gamma"]);
        let workspaces = discover(repo.root()).unwrap();
        let locations: Vec<&str> = workspaces.iter().map(|w| w.location.as_str()).collect();
        assert_eq!(
            locations,
            vec!["packages/alpha", "packages/beta", "packages/gamma"]
        );
        assert_eq!(workspaces[0].manifest.name, "@acme/alpha");
    }

    #[test]
    fn test_discover_skips_dirs_without_manifest() {
        let repo = MonorepoFixture::new(&["@acme/alpha"]);
        std::fs::create_dir_all(repo.root().join("packages/empty")).unwrap();
        let workspaces = discover(repo.root()).unwrap();
        assert_eq!(workspaces.len(), 1);
    }

    #[test]
    fn test_discover_missing_root_manifest() {
        let temp = crate::test_fixtures::create_temp_dir();
        let err = discover(temp.path()).unwrap_err();
        assert!(matches!(err, MonobuildError::ManifestReadFailed { .. }));
    }

    #[test]
    fn test_discover_no_workspaces_field() {
        let temp = crate::test_fixtures::create_temp_dir();
        std::fs::write(temp.path().join(MANIFEST_FILE), r#"{"name": "root"}"#).unwrap();
        assert!(discover(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_discover_dedupes_overlapping_patterns() {
        let repo = MonorepoFixture::new(&["@acme/alpha"]);
        std::fs::write(
            repo.root().join(MANIFEST_FILE),
            r#"{"name": "root", "workspaces": ["packages/*", "packages/alpha"]}"#,
        )
        .unwrap();
        let workspaces = discover(repo.root()).unwrap();
        assert_eq!(workspaces.len(), 1);
    }

    #[test]
    fn test_glob_files_sorted_and_filtered() {
        let repo = MonorepoFixture::new(&["@acme/alpha"]);
        let dir = repo.workspace_dir("alpha");
        repo.write_file("packages/alpha/src/zeta.ts", "export {}");
        repo.write_file("packages/alpha/src/alpha.tsx", "export {}");
        repo.write_file("packages/alpha/src/nested/mid.ts", "export {}");
        repo.write_file("packages/alpha/src/readme.md", "# no");

        let files = glob_files(&dir, SOURCE_GLOB).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| relative_slash_path(f, &dir).unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["src/alpha.tsx", "src/index.ts", "src/nested/mid.ts", "src/zeta.ts"]
        );
    }

    #[test]
    fn test_glob_files_missing_dir_is_empty() {
        let repo = MonorepoFixture::new(&["@acme/alpha"]);
        let files = glob_files(&repo.workspace_dir("alpha"), TEST_GLOB).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_location_in_types_root_strips_prefix() {
        let repo = MonorepoFixture::new(&["@acme/alpha"]);
        let workspaces = discover(repo.root()).unwrap();
        assert_eq!(workspaces[0].location_in_types_root(), "alpha");
    }

    #[test]
    fn test_invalid_glob_pattern() {
        let temp = crate::test_fixtures::create_temp_dir();
        std::fs::write(
            temp.path().join(MANIFEST_FILE),
            r#"{"name": "root", "workspaces": ["packages/["]}"#,
        )
        .unwrap();
        let err = discover(temp.path()).unwrap_err();
        assert!(matches!(err, MonobuildError::InvalidGlob { .. }));
    }
}
