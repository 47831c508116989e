//! # Reference Resolver
//!
//! This module provides the `ReferenceResolver`, the high-level interface
//! that turns a reference string into a locally materialized, cached path.
//! Network and VCS operations happen only on a cache miss; on success the
//! returned path always exists and is fully populated.
//!
//! ## Design
//!
//! Resolution dispatches exhaustively over the parsed
//! [`SourceReference`](crate::reference::SourceReference) kind:
//!
//! - **absolute path**: existence check only, no caching.
//! - **git**: shallow clone into an isolated staging directory, read the
//!   resulting commit hash, and publish under that hash. The commit, not the
//!   ref string, is the cache key, so two branches pointing at the same
//!   commit share one entry. When a subdirectory was requested only that
//!   subtree is published, under a `{commit}_{subdir-token}` key.
//! - **http**: download keyed on the normalized URL, preserving the final
//!   path segment in the cached filename.
//! - **generic object store**: local-file locations resolve directly;
//!   remote objects download into a directory keyed on the normalized URL,
//!   preserving the original basename.
//!
//! Git and object-store operations sit behind traits
//! ([`GitOperations`](crate::git::GitOperations),
//! [`ObjectStoreBackend`](crate::fetch::ObjectStoreBackend)) so tests can
//! simulate fetches, cache hits, and mid-fetch failures without a network.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::cache::ContentCache;
use crate::error::{Error, Result};
use crate::fetch::{self, DefaultObjectStore, ObjectStoreBackend};
use crate::git::{self, DefaultGitOperations, GitOperations};
use crate::reference::SourceReference;

/// Subtree of the cache root holding commit-addressed git content
pub const GIT_CACHE_DIR: &str = "git";
/// Subtree of the cache root holding downloaded http files
pub const HTTP_CACHE_DIR: &str = "http";
/// Subtree of the cache root holding generic object-store content
pub const OBJECT_CACHE_DIR: &str = "objects";

/// Resolves reference strings to local filesystem paths.
pub struct ReferenceResolver {
    git_cache: ContentCache,
    http_cache: ContentCache,
    object_cache: ContentCache,
    git_ops: Box<dyn GitOperations>,
    object_store: Box<dyn ObjectStoreBackend>,
}

impl ReferenceResolver {
    /// Create a resolver storing cached content under `cache_root`.
    ///
    /// The root is an explicit parameter rather than ambient state so
    /// callers (and tests) can isolate caches.
    pub fn new<P: Into<PathBuf>>(cache_root: P) -> Self {
        let cache_root = cache_root.into();
        Self {
            git_cache: ContentCache::new(cache_root.join(GIT_CACHE_DIR)),
            http_cache: ContentCache::new(cache_root.join(HTTP_CACHE_DIR)),
            object_cache: ContentCache::new(cache_root.join(OBJECT_CACHE_DIR)),
            git_ops: Box::new(DefaultGitOperations),
            object_store: Box::new(DefaultObjectStore),
        }
    }

    /// Create a resolver with injected git and object-store operations.
    ///
    /// This is primarily used for testing to simulate fetches without a
    /// network.
    pub fn with_operations<P: Into<PathBuf>>(
        cache_root: P,
        git_ops: Box<dyn GitOperations>,
        object_store: Box<dyn ObjectStoreBackend>,
    ) -> Self {
        let cache_root = cache_root.into();
        Self {
            git_cache: ContentCache::new(cache_root.join(GIT_CACHE_DIR)),
            http_cache: ContentCache::new(cache_root.join(HTTP_CACHE_DIR)),
            object_cache: ContentCache::new(cache_root.join(OBJECT_CACHE_DIR)),
            git_ops,
            object_store,
        }
    }

    /// Resolve a reference string to a local path.
    ///
    /// Fails with a typed error on any unrecoverable failure; never returns
    /// a partial or nonexistent path on success.
    pub fn resolve(&self, reference: &str) -> Result<PathBuf> {
        match SourceReference::parse(reference)? {
            SourceReference::AbsolutePath(path) => {
                if path.exists() {
                    Ok(path)
                } else {
                    Err(Error::PathNotFound { path })
                }
            }
            SourceReference::Git {
                url,
                r#ref,
                subdirectory,
            } => self.resolve_git(&url, &r#ref, subdirectory.as_deref()),
            SourceReference::Http(url) => self.resolve_http(&url),
            SourceReference::ObjectStore(location) => self.resolve_object_store(&location),
        }
    }

    /// Clone, read the commit, and publish under the commit-derived key.
    fn resolve_git(&self, url: &str, ref_name: &str, subdirectory: Option<&str>) -> Result<PathBuf> {
        fs::create_dir_all(self.git_cache.root())?;
        // Staging inside the cache root keeps the final rename on one
        // filesystem; the TempDir guard removes leftovers on every exit path
        let staging = tempfile::Builder::new()
            .prefix(".clone-")
            .tempdir_in(self.git_cache.root())?;
        let clone_dir = staging.path().join("repo");

        if git::is_commit_hash(ref_name) {
            self.git_ops.clone_shallow(url, None, &clone_dir)?;
            self.git_ops.checkout_commit(&clone_dir, ref_name)?;
        } else {
            self.git_ops.clone_shallow(url, Some(ref_name), &clone_dir)?;
        }
        let commit = self.git_ops.rev_parse_head(&clone_dir)?;

        let key = match subdirectory {
            Some(sub) => format!("{}_{}", commit, git::sanitize_token(sub)),
            None => commit.clone(),
        };

        // Fast path: the commit was already resolved under another ref; the
        // fresh clone is discarded without a redundant move
        if self.git_cache.exists(&key) {
            debug!("git cache hit for {}@{} ({})", url, ref_name, key);
            return Ok(self.git_cache.path_for(&key));
        }

        let source_root = match subdirectory {
            Some(sub) => {
                let subtree = clone_dir.join(sub);
                if !subtree.exists() {
                    return Err(Error::MissingSubdirectory {
                        url: url.to_string(),
                        r#ref: ref_name.to_string(),
                        subdirectory: sub.to_string(),
                        resolved_root: clone_dir.display().to_string(),
                    });
                }
                subtree
            }
            None => {
                git::strip_git_dir(&clone_dir)?;
                clone_dir.clone()
            }
        };

        self.git_cache.publish(&key, |payload| {
            fs::rename(&source_root, payload)?;
            Ok(())
        })
    }

    /// Cached download of a single http object.
    fn resolve_http(&self, url: &str) -> Result<PathBuf> {
        let key = format!("{}-{}", fetch::url_key(url)?, fetch::url_basename(url));
        if self.http_cache.exists(&key) {
            debug!("http cache hit for {} ({})", url, key);
            return Ok(self.http_cache.path_for(&key));
        }

        fs::create_dir_all(self.http_cache.root())?;
        let final_path = self.http_cache.path_for(&key);
        fetch::http_fetch(url, &final_path)?;
        Ok(final_path)
    }

    /// Resolve a generic object-store location, caching remote content under
    /// the normalized-URL key.
    fn resolve_object_store(&self, location: &str) -> Result<PathBuf> {
        if let Some(local) = self.object_store.local_path(location) {
            return if local.exists() {
                Ok(local)
            } else {
                Err(Error::PathNotFound { path: local })
            };
        }

        let key = fetch::url_key(location)?;
        let basename = fetch::url_basename(location);

        if self.object_cache.exists(&key) {
            debug!("object cache hit for {} ({})", location, key);
            return Ok(self.object_cache.path_for(&key).join(&basename));
        }

        let entry = self.object_cache.publish(&key, |payload| {
            fs::create_dir_all(payload)?;
            self.object_store.fetch(location, &payload.join(&basename))
        })?;
        Ok(entry.join(basename))
    }
}
