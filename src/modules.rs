//! # Module Dependency Resolver
//!
//! This module provides the `ModuleResolver`, which maps named modules
//! declared in a manifest onto content-addressed cache entries and publishes
//! each one into a per-namespace symlink tree, so many manifests share one
//! cached copy of identical content.
//!
//! ## Resolution flow
//!
//! For each declared module with a `source`:
//!
//! 1. Parse the source with the lenient git grammar (module sources are
//!    always git-flavored; a missing `@ref` means the remote HEAD).
//! 2. Ask the remote for the commit hash via a lightweight listing; no
//!    clone happens when the commit is already cached.
//! 3. On a miss, shallow-clone the whole repository into the hash-keyed
//!    cache slot (atomic publish).
//! 4. Locate the declared subdirectory inside the entry, failing loudly if
//!    absent.
//! 5. Create or repoint the symlink `modules/{namespace}/{module_id}`. A
//!    link already pointing at the right target is left untouched.
//!
//! ## Failure semantics
//!
//! Remote-lookup failure, clone failure, and missing subdirectories are
//! per-module failures: they are logged, recorded as an `error` status in
//! the result map, and never interrupt resolution of sibling modules. The
//! only manifest-level failure is a manifest parse error.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Serialize, Serializer};

use crate::cache::ContentCache;
use crate::error::{Error, Result};
use crate::git::{self, DefaultGitOperations, GitOperations};
use crate::manifest::{ModuleManifest, ModuleType};
use crate::reference::GitSource;
use crate::resolver::GIT_CACHE_DIR;

/// Outcome of resolving one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleStatus {
    /// Freshly fetched into the cache
    Resolved,
    /// Already present in the cache
    Cached,
    /// Failed; the message carries the underlying cause
    Error(String),
}

impl ModuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleStatus::Resolved => "resolved",
            ModuleStatus::Cached => "cached",
            ModuleStatus::Error(_) => "error",
        }
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ModuleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Resolves manifest-declared modules into the commit-addressed cache and
/// maintains the namespace symlink tree.
pub struct ModuleResolver {
    cache: ContentCache,
    modules_root: PathBuf,
    git_ops: Box<dyn GitOperations>,
}

impl ModuleResolver {
    /// Create a resolver. `cache_root` is the same root the reference
    /// resolver uses (module content lands in its commit-addressed `git`
    /// subtree); `modules_root` holds the namespace symlink tree. Both are
    /// explicit parameters so tests can isolate them.
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(cache_root: P, modules_root: Q) -> Self {
        Self {
            cache: ContentCache::new(cache_root.into().join(GIT_CACHE_DIR)),
            modules_root: modules_root.into(),
            git_ops: Box::new(DefaultGitOperations),
        }
    }

    /// Create a resolver with injected git operations, for testing.
    pub fn with_operations<P: Into<PathBuf>, Q: Into<PathBuf>>(
        cache_root: P,
        modules_root: Q,
        git_ops: Box<dyn GitOperations>,
    ) -> Self {
        Self {
            cache: ContentCache::new(cache_root.into().join(GIT_CACHE_DIR)),
            modules_root: modules_root.into(),
            git_ops,
        }
    }

    /// Resolve every module a manifest declares into `namespace`.
    ///
    /// Returns a status per declared module that carries a `source`. One
    /// module's failure is recorded and logged, never raised; a manifest
    /// parse failure aborts the whole call.
    pub fn resolve_manifest(
        &self,
        manifest_path: &Path,
        namespace: &str,
    ) -> Result<BTreeMap<String, ModuleStatus>> {
        let manifest = ModuleManifest::from_path(manifest_path)?;
        let mut statuses = BTreeMap::new();

        for (module_type, declaration) in manifest.declared_modules() {
            // Entries without a source are resolved elsewhere
            let Some(source) = declaration.source.as_deref() else {
                continue;
            };
            let status = match self.resolve_single_module(
                &declaration.module,
                source,
                namespace,
                module_type,
            ) {
                Ok(status) => status,
                Err(e) => {
                    warn!(
                        "failed to resolve {} '{}' from {}: {}",
                        module_type, declaration.module, source, e
                    );
                    ModuleStatus::Error(e.to_string())
                }
            };
            statuses.insert(declaration.module.clone(), status);
        }

        Ok(statuses)
    }

    /// Resolve one module and wire up its namespace symlink.
    pub fn resolve_single_module(
        &self,
        module_id: &str,
        source: &str,
        namespace: &str,
        module_type: ModuleType,
    ) -> Result<ModuleStatus> {
        let parsed = GitSource::parse(source)?;
        let commit = self
            .git_ops
            .ls_remote_commit(&parsed.url, parsed.reference.as_deref())?;

        let status = if self.cache.exists(&commit) {
            debug!(
                "{} '{}' already cached at {}",
                module_type, module_id, commit
            );
            ModuleStatus::Cached
        } else {
            self.cache.publish(&commit, |payload| {
                self.clone_into(&parsed, &commit, payload)
            })?;
            ModuleStatus::Resolved
        };

        let entry = self.cache.path_for(&commit);
        let target = match parsed.subdirectory.as_deref() {
            Some(subdirectory) => {
                let subtree = entry.join(subdirectory);
                if !subtree.exists() {
                    return Err(Error::MissingSubdirectory {
                        url: parsed.url.clone(),
                        r#ref: parsed.reference.unwrap_or_else(|| "HEAD".to_string()),
                        subdirectory: subdirectory.to_string(),
                        resolved_root: entry.display().to_string(),
                    });
                }
                subtree
            }
            None => entry,
        };

        self.ensure_namespace_link(namespace, module_id, &target)?;
        Ok(status)
    }

    /// Shallow-clone the module source into a staging payload.
    fn clone_into(&self, source: &GitSource, commit: &str, payload: &Path) -> Result<()> {
        match source.reference.as_deref() {
            Some(r) if git::is_commit_hash(r) => {
                self.git_ops.clone_shallow(&source.url, None, payload)?;
                self.git_ops.checkout_commit(payload, commit)?;
            }
            reference => self.git_ops.clone_shallow(&source.url, reference, payload)?,
        }
        git::strip_git_dir(payload)
    }

    /// Create or repoint `modules/{namespace}/{module_id}`.
    ///
    /// A link already pointing at `target` is a no-op; a stale link is
    /// replaced. The module resolver exclusively owns link maintenance;
    /// consumers only read through it.
    fn ensure_namespace_link(&self, namespace: &str, module_id: &str, target: &Path) -> Result<()> {
        let namespace_dir = self.modules_root.join(namespace);
        fs::create_dir_all(&namespace_dir)?;
        let link = namespace_dir.join(module_id);

        match fs::read_link(&link) {
            Ok(existing) if existing == target => return Ok(()),
            Ok(_) => fs::remove_file(&link)?,
            Err(_) if link.exists() => {
                // not a symlink; the resolver owns this slot
                return Err(Error::Cache {
                    message: format!(
                        "module link path {} exists and is not a symlink",
                        link.display()
                    ),
                });
            }
            Err(_) => {}
        }

        make_symlink(target, &link)?;
        Ok(())
    }

    /// The namespace symlink path for a module.
    pub fn module_link_path(&self, namespace: &str, module_id: &str) -> PathBuf {
        self.modules_root.join(namespace).join(module_id)
    }
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
