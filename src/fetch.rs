//! # Remote Content Fetching
//!
//! This module holds the pieces of resolution that talk to plain remote
//! endpoints rather than version control: URL normalization and cache-key
//! derivation, blocking HTTP download with the dot-prefixed-sibling atomic
//! rename, and the object-store backend seam.
//!
//! ## URL normalization
//!
//! Object-store and http cache keys are derived from a *normalized* URL so
//! that trivially different spellings of the same endpoint share one cache
//! entry: scheme and host are lowercased, default http/https ports are
//! stripped, the trailing slash on the path is removed, and query parameters
//! are sorted. The key is the first 8 hex characters of the SHA-256 of that
//! normalized form.
//!
//! ## Object-store backend
//!
//! The backend is a trait so tests can serve directories without a network.
//! The default backend resolves `file://` URLs (and already-existing local
//! paths, as a convenience) directly without caching, downloads single
//! `http(s)` objects, and reports any other scheme as an unreachable source.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use url::Url;

use crate::error::{Error, Result};

/// Length of the derived URL cache key
const URL_KEY_LEN: usize = 8;

/// Fallback filename when a URL has no usable final path segment
const FALLBACK_BASENAME: &str = "download";

/// Normalize a URL for cache-key derivation.
///
/// Lowercases scheme and host (the parser's behavior), strips default
/// http/https ports, removes the trailing slash from the path, and sorts
/// query parameters.
pub fn normalize_url(raw: &str) -> Result<String> {
    let mut url = Url::parse(raw)?;

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        pairs.sort();
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    Ok(url.to_string())
}

/// Derive the 8-character cache key for a URL from its normalized form.
pub fn url_key(raw: &str) -> Result<String> {
    let normalized = normalize_url(raw)?;
    let digest = Sha256::digest(normalized.as_bytes());
    Ok(hex::encode(digest)[..URL_KEY_LEN].to_string())
}

/// The final non-empty path segment of a URL, used to keep cached downloads
/// human-readable.
pub fn url_basename(raw: &str) -> String {
    if let Ok(url) = Url::parse(raw) {
        return url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .unwrap_or(FALLBACK_BASENAME)
            .to_string();
    }
    raw.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_BASENAME)
        .to_string()
}

/// Download `url` into the file at `final_path`.
///
/// The body streams into a `.`-prefixed sibling first; the final name
/// appears only via rename, so readers never observe a partial download. The
/// sibling is removed on failure.
pub fn http_fetch(url: &str, final_path: &Path) -> Result<()> {
    if let Some(parent) = final_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file_name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| FALLBACK_BASENAME.to_string());
    let temp_path = final_path.with_file_name(format!(".{}", file_name));

    let result = stream_to_file(url, &temp_path);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
        return result;
    }

    fs::rename(&temp_path, final_path)?;
    Ok(())
}

fn stream_to_file(url: &str, dest: &Path) -> Result<()> {
    let mut response = reqwest::blocking::get(url)?;
    if !response.status().is_success() {
        return Err(Error::Network {
            url: url.to_string(),
            message: format!("HTTP status {}", response.status()),
        });
    }
    let mut file = fs::File::create(dest)?;
    io::copy(&mut response, &mut file)?;
    Ok(())
}

/// Seam over the generic object-store protocol, mockable in tests.
pub trait ObjectStoreBackend: Send + Sync {
    /// When the backend treats `location` as a local file protocol, the
    /// local path to resolve directly (no caching). `None` for remote
    /// locations.
    fn local_path(&self, location: &str) -> Option<PathBuf>;

    /// Materialize the object (a file, or a directory tree fetched
    /// recursively) at `location` into `dest`. `dest` does not exist yet.
    fn fetch(&self, location: &str, dest: &Path) -> Result<()>;
}

/// Default backend: `file://` and existing local paths resolve in place;
/// single `http(s)` objects download; other schemes are rejected.
pub struct DefaultObjectStore;

impl ObjectStoreBackend for DefaultObjectStore {
    fn local_path(&self, location: &str) -> Option<PathBuf> {
        if let Ok(url) = Url::parse(location) {
            if url.scheme() == "file" {
                return url.to_file_path().ok();
            }
        }
        // Convenience: a literal local path that already exists is returned
        // unresolved
        let candidate = Path::new(location);
        if candidate.exists() {
            return Some(candidate.to_path_buf());
        }
        None
    }

    fn fetch(&self, location: &str, dest: &Path) -> Result<()> {
        match Url::parse(location) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                http_fetch(location, dest)
            }
            Ok(url) => Err(Error::UnsupportedScheme {
                scheme: url.scheme().to_string(),
                url: location.to_string(),
            }),
            Err(e) => Err(Error::Network {
                url: location.to_string(),
                message: e.to_string(),
            }),
        }
    }
}
