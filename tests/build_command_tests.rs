//! Build command integration tests
//!
//! These run the real binary but only exercise paths that never reach the
//! external bundler or type checker, so they work without esbuild or tsc
//! installed.

mod common;

use assert_cmd::Command;
use common::TestRepo;
use predicates::prelude::*;

fn monobuild_cmd() -> Command {
    Command::cargo_bin("monobuild").unwrap()
}

#[test]
fn test_build_without_root_manifest_fails() {
    let repo = TestRepo::empty();
    monobuild_cmd()
        .current_dir(&repo.path)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read manifest"));
}

#[test]
fn test_build_with_no_workspaces_succeeds() {
    let repo = TestRepo::empty();
    repo.write_file("package.json", r#"{"name": "root", "workspaces": []}"#);
    monobuild_cmd()
        .current_dir(&repo.path)
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workspaces selected"));
}

#[test]
fn test_build_with_unmatched_filter_succeeds() {
    let repo = TestRepo::with_packages(&["@acme/alpha"]);
    monobuild_cmd()
        .current_dir(&repo.path)
        .args(["build", "zzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No workspaces selected"));
}

#[test]
fn test_build_with_all_workspaces_excluded_succeeds() {
    let repo = TestRepo::with_packages(&["@acme/alpha"]);
    repo.write_file("monobuild.yaml", "exclude:\n  - \"@acme/alpha\"\n");
    monobuild_cmd()
        .current_dir(&repo.path)
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workspaces selected"));
}

#[test]
fn test_build_with_invalid_config_fails() {
    let repo = TestRepo::with_packages(&["@acme/alpha"]);
    repo.write_file("monobuild.yaml", "exclude: {broken");
    monobuild_cmd()
        .current_dir(&repo.path)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn test_build_with_cwd_flag() {
    let repo = TestRepo::empty();
    repo.write_file("package.json", r#"{"name": "root", "workspaces": []}"#);
    monobuild_cmd()
        .args(["--cwd", repo.path.to_str().unwrap(), "build"])
        .assert()
        .success();
}
