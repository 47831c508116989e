//! Default values for sourcelink configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Returns the default cache root directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/sourcelink` (XDG Base Directory)
/// - macOS: `~/Library/Caches/sourcelink`
/// - Windows: `{FOLDERID_LocalAppData}\sourcelink`
///
/// Falls back to `.sourcelink-cache` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by the `--cache-root` CLI flag or the
/// `SOURCELINK_CACHE` environment variable.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".sourcelink-cache"))
        .join("sourcelink")
}

/// Returns the default root of the namespace symlink tree.
///
/// Lives beside the cache under the platform data directory, falling back
/// to `.sourcelink-modules` in the current directory.
pub fn default_modules_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from(".sourcelink-modules"))
        .join("sourcelink")
        .join("modules")
}
