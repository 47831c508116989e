//! # Content-Addressable Cache
//!
//! On-disk storage keyed by a stable content identity (a resolved commit
//! hash, or a hash of a normalized URL). Entries are created exactly once on
//! first successful resolution of a key and are immutable afterwards; the
//! cache never mutates or evicts existing entries.
//!
//! ## Atomicity
//!
//! All population follows "write to private, then rename into public": a
//! producer runs against an isolated staging location inside the cache root,
//! and the result becomes visible through a single `rename`. A reader either
//! sees nothing or sees a complete entry, never a partial one. Two
//! uncoordinated writers may both perform the fetch; whichever finishes
//! first wins, and the loser's staging output is discarded in favor of the
//! existing entry.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Prefix for staging directories awaiting publication
const STAGING_PREFIX: &str = ".tmp-";

/// An on-disk content-addressable cache rooted at a single directory.
#[derive(Debug, Clone)]
pub struct ContentCache {
    root: PathBuf,
}

/// Summary of one published cache entry, for listings.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheEntryInfo {
    pub key: String,
    pub size: u64,
    pub file_count: usize,
    #[serde(skip)]
    pub modified: Option<SystemTime>,
}

impl ContentCache {
    /// Create a cache handle rooted at `root`. The directory is created
    /// lazily on first publish.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check whether a fully published entry exists for `key`.
    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }

    /// The slot path for `key`. Only points at real content when
    /// [`exists`](Self::exists) is true.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Return the existing entry for `key`, or run `producer` and publish
    /// its output atomically.
    ///
    /// The producer receives a staging path that does not exist yet and must
    /// create it (as a file or a directory). On producer failure the staging
    /// area is removed and the error propagates; the public slot is left
    /// untouched, so an entry published by a concurrent writer survives an
    /// unrelated failure here.
    pub fn get_or_publish<F>(&self, key: &str, producer: F) -> Result<PathBuf>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        if self.exists(key) {
            return Ok(self.path_for(key));
        }
        self.publish(key, producer)
    }

    /// Run `producer` against an isolated staging location, then rename the
    /// result into the `key`-addressed slot.
    ///
    /// Staging lives inside the cache root so the final rename never crosses
    /// a filesystem boundary. If another writer published the key first, the
    /// staged output is discarded and the existing entry is returned.
    pub fn publish<F>(&self, key: &str, producer: F) -> Result<PathBuf>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let final_path = self.path_for(key);
        if final_path.exists() {
            return Ok(final_path);
        }

        fs::create_dir_all(&self.root)?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.root)?;
        let payload = staging.path().join("payload");

        // Producer failure drops `staging`, removing partial output
        producer(&payload)?;

        if !payload.exists() {
            return Err(Error::Cache {
                message: format!("producer for key '{}' created no output", key),
            });
        }

        match fs::rename(&payload, &final_path) {
            Ok(()) => Ok(final_path),
            // Lost a publish race: defer to the entry that got there first
            Err(_) if final_path.exists() => Ok(final_path),
            Err(e) => Err(Error::Cache {
                message: format!("failed to publish key '{}': {}", key, e),
            }),
        }
    }

    /// Enumerate published entries, skipping staging leftovers.
    pub fn entries(&self) -> Result<Vec<CacheEntryInfo>> {
        let mut entries = Vec::new();
        if !self.root.exists() {
            return Ok(entries);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }

            let path = entry.path();
            let (size, file_count) = measure(&path);
            entries.push(CacheEntryInfo {
                key: name,
                size,
                file_count,
                modified: entry.metadata().and_then(|m| m.modified()).ok(),
            });
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}

/// Total size in bytes and file count under `path` (1/1 for a plain file).
fn measure(path: &Path) -> (u64, usize) {
    if path.is_file() {
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        return (size, 1);
    }

    let mut size = 0;
    let mut count = 0;
    for entry in WalkDir::new(path).into_iter().flatten() {
        if entry.file_type().is_file() {
            size += entry.metadata().map(|m| m.len()).unwrap_or(0);
            count += 1;
        }
    }
    (size, count)
}
