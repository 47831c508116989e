//! Shared test utilities for integration and E2E tests.
//!
//! These tests exercise real resolution against repositories created on the
//! local filesystem with the system `git` binary, so no network access is
//! required. Tests that need git call [`git_available`] first and skip
//! themselves when it is missing.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Whether the system git binary can be invoked.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run a git subcommand inside `dir`, panicking on failure.
#[allow(dead_code)]
pub fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("failed to invoke git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A throwaway git repository on the local filesystem.
///
/// Cloning and ls-remote both accept plain paths, so these repos stand in
/// for remote origins without any network.
#[allow(dead_code)]
pub struct FixtureRepo {
    _temp: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl FixtureRepo {
    /// Create a repository on branch `main` containing a README plus
    /// `bash/tool.yaml` and `python/tool.yaml` subdirectories.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = temp.path().join("origin");
        std::fs::create_dir_all(&path).unwrap();

        run_git(&path, &["init", "--quiet"]);
        run_git(&path, &["config", "user.email", "tests@example.com"]);
        run_git(&path, &["config", "user.name", "Test Fixture"]);

        std::fs::write(path.join("README.md"), "# fixture repository\n").unwrap();
        std::fs::create_dir_all(path.join("bash")).unwrap();
        std::fs::write(path.join("bash/tool.yaml"), "name: bash-tool\n").unwrap();
        std::fs::create_dir_all(path.join("python")).unwrap();
        std::fs::write(path.join("python/tool.yaml"), "name: python-tool\n").unwrap();

        run_git(&path, &["add", "."]);
        run_git(&path, &["commit", "--quiet", "-m", "initial content"]);
        run_git(&path, &["branch", "-M", "main"]);

        Self { _temp: temp, path }
    }

    /// The repository path as a reference URL component.
    pub fn url(&self) -> String {
        self.path.display().to_string()
    }

    /// Create `name` pointing at the current commit.
    pub fn branch(&self, name: &str) {
        run_git(&self.path, &["branch", name]);
    }

    /// Commit a new file, advancing `main`.
    pub fn commit_file(&self, relative: &str, content: &str) {
        let file = self.path.join(relative);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&file, content).unwrap();
        run_git(&self.path, &["add", "."]);
        run_git(&self.path, &["commit", "--quiet", "-m", "update content"]);
    }

    /// The commit hash `main` currently points at.
    pub fn head_commit(&self) -> String {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.path)
            .args(["rev-parse", "HEAD"])
            .output()
            .expect("failed to invoke git");
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}
