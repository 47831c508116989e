//! E2E tests for the `sourcelink` CLI.
//!
//! Drives the compiled binary with `assert_cmd` against temp cache roots
//! and local fixture repositories.

mod common;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use common::FixtureRepo;
use predicates::prelude::*;

fn sourcelink() -> Command {
    Command::cargo_bin("sourcelink").unwrap()
}

#[test]
fn test_resolve_absolute_path_prints_it() {
    let temp = TempDir::new().unwrap();
    temp.child("content/file.txt").write_str("hello").unwrap();

    sourcelink()
        .arg("resolve")
        .arg(temp.child("content").path())
        .arg("--cache-root")
        .arg(temp.child("cache").path())
        .assert()
        .success()
        .stdout(predicate::str::contains("content"));
}

#[test]
fn test_resolve_missing_path_fails() {
    let temp = TempDir::new().unwrap();
    sourcelink()
        .arg("resolve")
        .arg("/no/such/path/anywhere")
        .arg("--cache-root")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path does not exist"));
}

#[test]
fn test_resolve_malformed_git_reference_fails_with_grammar_hint() {
    let temp = TempDir::new().unwrap();
    sourcelink()
        .arg("resolve")
        .arg("git+https://example.com/org/tools")
        .arg("--cache-root")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing '@ref'"));
}

#[test]
fn test_modules_command_resolves_manifest() {
    if !common::git_available() {
        eprintln!("git not available; skipping");
        return;
    }

    let repo = FixtureRepo::new();
    let temp = TempDir::new().unwrap();
    let manifest = temp.child("modules.yaml");
    manifest
        .write_str(&format!(
            "tools:\n  - module: bash-tool\n    source: git+{}@main#subdirectory=bash\n",
            repo.url()
        ))
        .unwrap();

    sourcelink()
        .arg("modules")
        .arg(manifest.path())
        .arg("--namespace")
        .arg("demo")
        .arg("--cache-root")
        .arg(temp.child("cache").path())
        .arg("--modules-root")
        .arg(temp.child("modules").path())
        .assert()
        .success()
        .stdout(predicate::str::contains("bash-tool"))
        .stdout(predicate::str::contains("resolved"));

    // repeat run reports the cached status
    sourcelink()
        .arg("modules")
        .arg(manifest.path())
        .arg("--namespace")
        .arg("demo")
        .arg("--cache-root")
        .arg(temp.child("cache").path())
        .arg("--modules-root")
        .arg(temp.child("modules").path())
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bash-tool\": \"cached\""));

    temp.child("modules/demo/bash-tool/tool.yaml")
        .assert(predicate::path::exists());
}

#[test]
fn test_modules_strict_fails_on_broken_module() {
    if !common::git_available() {
        eprintln!("git not available; skipping");
        return;
    }

    let temp = TempDir::new().unwrap();
    let manifest = temp.child("modules.yaml");
    manifest
        .write_str("tools:\n  - module: broken\n    source: git+/no/such/repo@main\n")
        .unwrap();

    sourcelink()
        .arg("modules")
        .arg(manifest.path())
        .arg("--namespace")
        .arg("demo")
        .arg("--cache-root")
        .arg(temp.child("cache").path())
        .arg("--modules-root")
        .arg(temp.child("modules").path())
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to resolve"));
}

#[test]
fn test_modules_invalid_manifest_fails() {
    let temp = TempDir::new().unwrap();
    let manifest = temp.child("modules.yaml");
    manifest.write_str("tools: [unclosed").unwrap();

    sourcelink()
        .arg("modules")
        .arg(manifest.path())
        .arg("--namespace")
        .arg("demo")
        .arg("--cache-root")
        .arg(temp.child("cache").path())
        .arg("--modules-root")
        .arg(temp.child("modules").path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Manifest parse error"));
}

#[test]
fn test_cache_list_empty() {
    let temp = TempDir::new().unwrap();
    sourcelink()
        .arg("cache")
        .arg("--cache-root")
        .arg(temp.child("cache").path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached entries found."));
}

#[test]
fn test_cache_list_after_resolution() {
    if !common::git_available() {
        eprintln!("git not available; skipping");
        return;
    }

    let repo = FixtureRepo::new();
    let temp = TempDir::new().unwrap();
    let cache_root = temp.child("cache");

    sourcelink()
        .arg("resolve")
        .arg(format!("git+{}@main", repo.url()))
        .arg("--cache-root")
        .arg(cache_root.path())
        .assert()
        .success();

    sourcelink()
        .arg("cache")
        .arg("--cache-root")
        .arg(cache_root.path())
        .arg("list")
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains(repo.head_commit()));
}

#[test]
fn test_completions_generate() {
    sourcelink()
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("sourcelink"));
}
