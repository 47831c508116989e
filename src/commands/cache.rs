//! # Cache Command Implementation
//!
//! This module implements the `cache` subcommand, which provides read-only
//! visibility into the content cache.
//!
//! ## Subcommands
//!
//! - **`list`**: Display all cached entries with their information
//!
//! The cache is append-only by design: entries are created once and never
//! evicted, so there is deliberately no `clean` subcommand.

use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::Result;
use clap::{Args, Subcommand};

use sourcelink::cache::{CacheEntryInfo, ContentCache};
use sourcelink::defaults;
use sourcelink::resolver::{GIT_CACHE_DIR, HTTP_CACHE_DIR, OBJECT_CACHE_DIR};

/// Inspect the content cache
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// The root directory for the content cache.
    ///
    /// If not provided, it defaults to the system's cache directory
    /// (e.g., `~/.cache/sourcelink` on Linux).
    /// Can also be set with the `SOURCELINK_CACHE` environment variable.
    #[arg(long, value_name = "DIR", env = "SOURCELINK_CACHE")]
    pub cache_root: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// List all cached entries
    List(ListArgs),
}

/// Arguments for the cache list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show detailed information including last modified time and file count
    #[arg(long)]
    pub detailed: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// One listed entry, tagged with the addressing scheme it lives under.
#[derive(Debug, serde::Serialize)]
struct ListedEntry {
    scheme: &'static str,
    #[serde(flatten)]
    info: CacheEntryInfo,
}

/// Execute the `cache` command.
pub fn execute(args: CacheArgs) -> Result<()> {
    match args.command {
        CacheSubcommand::List(list_args) => execute_list(args.cache_root, list_args),
    }
}

/// Execute the `cache list` command.
fn execute_list(cache_root: Option<PathBuf>, args: ListArgs) -> Result<()> {
    let cache_root = cache_root.unwrap_or_else(defaults::default_cache_root);

    if !cache_root.exists() {
        if args.json {
            println!("[]");
        } else {
            println!("Cache directory does not exist: {}", cache_root.display());
            println!("No cached entries found.");
        }
        return Ok(());
    }

    let mut entries = Vec::new();
    for scheme in [GIT_CACHE_DIR, HTTP_CACHE_DIR, OBJECT_CACHE_DIR] {
        let cache = ContentCache::new(cache_root.join(scheme));
        entries.extend(
            cache
                .entries()?
                .into_iter()
                .map(|info| ListedEntry { scheme, info }),
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No cached entries found.");
        return Ok(());
    }

    for entry in &entries {
        if args.detailed {
            println!(
                "{:<8} {:<48} {:>10}  {:>6} files  {}",
                entry.scheme,
                entry.info.key,
                format_size(entry.info.size),
                entry.info.file_count,
                format_mtime(entry.info.modified),
            );
        } else {
            println!("{:<8} {}", entry.scheme, entry.info.key);
        }
    }
    println!("\n{} entries in {}", entries.len(), cache_root.display());
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn format_mtime(mtime: Option<SystemTime>) -> String {
    match mtime.and_then(|t| t.elapsed().ok()) {
        Some(age) => {
            let secs = age.as_secs();
            if secs < 60 {
                format!("{}s ago", secs)
            } else if secs < 3600 {
                format!("{}m ago", secs / 60)
            } else if secs < 86400 {
                format!("{}h ago", secs / 3600)
            } else {
                format!("{}d ago", secs / 86400)
            }
        }
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn test_format_mtime_recent() {
        let formatted = format_mtime(Some(SystemTime::now()));
        assert!(formatted.ends_with("s ago"));
    }

    #[test]
    fn test_format_mtime_unknown() {
        assert_eq!(format_mtime(None), "unknown");
    }
}
