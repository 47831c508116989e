//! System-git wrappers for cloning and remote inspection.
//!
//! This uses the system git command, which automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Trait for git operations - allows mocking in tests.
///
/// Both resolution engines go through this seam: the reference resolver
/// clones and reads the resulting commit, the module resolver lists the
/// remote first and clones only on a cache miss.
pub trait GitOperations: Send + Sync {
    /// Shallow-clone a repository (depth 1) at a branch or tag, or at the
    /// remote default branch when `ref_name` is `None`.
    fn clone_shallow(&self, url: &str, ref_name: Option<&str>, target_dir: &Path) -> Result<()>;

    /// Resolve a ref to a commit hash via a lightweight remote listing.
    fn ls_remote_commit(&self, url: &str, ref_name: Option<&str>) -> Result<String>;

    /// Read the commit a local clone's HEAD points at.
    fn rev_parse_head(&self, work_tree: &Path) -> Result<String>;

    /// Check out a specific commit inside an existing shallow clone.
    fn checkout_commit(&self, work_tree: &Path, commit: &str) -> Result<()>;
}

/// The default implementation of `GitOperations`, backed by the system `git`
/// command.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_shallow(&self, url: &str, ref_name: Option<&str>, target_dir: &Path) -> Result<()> {
        clone_shallow(url, ref_name, target_dir)
    }

    fn ls_remote_commit(&self, url: &str, ref_name: Option<&str>) -> Result<String> {
        ls_remote_commit(url, ref_name)
    }

    fn rev_parse_head(&self, work_tree: &Path) -> Result<String> {
        rev_parse_head(work_tree)
    }

    fn checkout_commit(&self, work_tree: &Path, commit: &str) -> Result<()> {
        checkout_commit(work_tree, commit)
    }
}

/// Clone a repository at a specific ref using shallow clone.
///
/// When `ref_name` is `None` the remote's default branch is cloned.
pub fn clone_shallow(url: &str, ref_name: Option<&str>, target_dir: &Path) -> Result<()> {
    // Remove target directory if it exists (git won't clone into existing non-empty dir)
    if target_dir.exists() {
        fs::remove_dir_all(target_dir)?;
    }

    // Create parent directory if it doesn't exist
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut command = Command::new("git");
    command.args(["clone", "--depth=1"]);
    if let Some(ref_name) = ref_name {
        command.args(["--branch", ref_name]);
    }
    command.arg(url).arg(target_dir);

    let displayed_ref = ref_name.unwrap_or("HEAD");
    let output = command.output().map_err(|e| Error::GitClone {
        url: url.to_string(),
        r#ref: displayed_ref.to_string(),
        message: e.to_string(),
        hint: None,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitClone {
            url: url.to_string(),
            r#ref: displayed_ref.to_string(),
            message: stderr.to_string(),
            hint: auth_hint(&stderr),
        });
    }

    Ok(())
}

/// Query the remote for the commit hash a ref points at, without cloning.
///
/// Uses `git ls-remote`, so a cache hit for an already-resolved commit costs
/// one listing and zero clones. A `ref_name` that is already a full commit
/// hash is returned as-is (ls-remote does not list unreferenced commits).
/// `None` resolves the remote HEAD.
pub fn ls_remote_commit(url: &str, ref_name: Option<&str>) -> Result<String> {
    if let Some(ref_name) = ref_name {
        if is_commit_hash(ref_name) {
            return Ok(ref_name.to_string());
        }
    }

    let mut command = Command::new("git");
    command.args(["ls-remote", url]);
    if let Some(ref_name) = ref_name {
        command.arg(ref_name);
    } else {
        command.arg("HEAD");
    }

    let output = command.output().map_err(|e| Error::GitCommand {
        command: "ls-remote".to_string(),
        url: url.to_string(),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: "ls-remote".to_string(),
            url: url.to_string(),
            stderr: stderr.to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    pick_remote_commit(&stdout, ref_name).ok_or_else(|| Error::GitCommand {
        command: "ls-remote".to_string(),
        url: url.to_string(),
        stderr: format!("no ref matching '{}'", ref_name.unwrap_or("HEAD")),
    })
}

/// Read the commit hash a local clone's HEAD points at.
pub fn rev_parse_head(work_tree: &Path) -> Result<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(work_tree)
        .args(["rev-parse", "HEAD"])
        .output()
        .map_err(|e| Error::GitCommand {
            command: "rev-parse HEAD".to_string(),
            url: work_tree.display().to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: "rev-parse HEAD".to_string(),
            url: work_tree.display().to_string(),
            stderr: stderr.to_string(),
        });
    }

    let commit = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !is_commit_hash(&commit) {
        return Err(Error::GitCommand {
            command: "rev-parse HEAD".to_string(),
            url: work_tree.display().to_string(),
            stderr: format!("unexpected output '{}'", commit),
        });
    }
    Ok(commit)
}

/// Check out a specific commit inside an existing shallow clone.
///
/// A depth-1 clone only carries its branch tip, so the commit is fetched
/// (depth 1) before the detached checkout when it is not already present.
pub fn checkout_commit(work_tree: &Path, commit: &str) -> Result<()> {
    let checkout = |quiet_fetch: bool| -> Result<()> {
        if quiet_fetch {
            run_in_tree(work_tree, &["fetch", "--depth=1", "origin", commit])?;
        }
        run_in_tree(work_tree, &["checkout", "--detach", commit])
    };

    // Try the cheap path first; fetch only when the commit is missing
    checkout(false).or_else(|_| checkout(true))
}

fn run_in_tree(work_tree: &Path, args: &[&str]) -> Result<()> {
    let output = Command::new("git")
        .arg("-C")
        .arg(work_tree)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            url: work_tree.display().to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: args.join(" "),
            url: work_tree.display().to_string(),
            stderr: stderr.to_string(),
        });
    }
    Ok(())
}

/// Remove the `.git` metadata directory from a clone before it is published
/// into the cache. Consumers read content, never git state.
pub fn strip_git_dir(work_tree: &Path) -> Result<()> {
    let git_dir = work_tree.join(".git");
    if git_dir.exists() {
        fs::remove_dir_all(git_dir)?;
    }
    Ok(())
}

/// Sanitize a ref or subdirectory for use inside a cache key (replace `/`
/// with `-`).
pub fn sanitize_token(token: &str) -> String {
    token.replace('/', "-")
}

/// Whether a ref string is already a full 40-hex commit hash.
pub fn is_commit_hash(s: &str) -> bool {
    s.len() == 40 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Pick the commit for `ref_name` out of `git ls-remote` output.
///
/// Output format: `<hash>\t<refname>` per line. Branch names win over tag
/// names when both exist.
fn pick_remote_commit(stdout: &str, ref_name: Option<&str>) -> Option<String> {
    let lines: Vec<(&str, &str)> = stdout
        .lines()
        .filter_map(|line| line.split_once('\t'))
        .collect();

    let wanted = ref_name.unwrap_or("HEAD");
    let candidates = [
        wanted.to_string(),
        format!("refs/heads/{}", wanted),
        format!("refs/tags/{}", wanted),
    ];

    for candidate in &candidates {
        if let Some((hash, _)) = lines.iter().find(|(_, name)| name == candidate) {
            return Some(hash.to_string());
        }
    }

    // ls-remote was already filtered by the ref argument; take what it gave us
    lines.first().map(|(hash, _)| hash.to_string())
}

/// Append an SSH/credential hint to auth-looking clone failures.
fn auth_hint(stderr: &str) -> Option<String> {
    let auth_failure = stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository");
    if auth_failure {
        Some(
            "Make sure you have access to the repository. For private repos, ensure you have:\n\
             - SSH key added to ssh-agent\n\
             - Git credentials configured\n\
             - Personal access token set up"
                .to_string(),
        )
    } else {
        None
    }
}
