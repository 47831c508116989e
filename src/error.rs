//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `sourcelink` library. It uses the `thiserror` library to create a
//! comprehensive `Error` enum covering every anticipated failure mode of
//! reference resolution and module dependency resolution, providing clear
//! and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors. Each
//!   variant corresponds to a specific type of failure and includes
//!   contextual information (the offending reference, the repository URL and
//!   ref, the missing subdirectory) to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library to simplify function signatures.
//!
//! The taxonomy distinguishes the cases a caller must tell apart:
//!
//! - Parse errors (the reference or manifest text matches no supported
//!   grammar): fatal to that single resolution, carry the offending string.
//! - Unreachable sources (network/VCS failure reaching the origin): wrapped
//!   with repository/ref context and remediation hints.
//! - Missing subtrees (a requested subdirectory absent from fetched
//!   content): carry repo/ref/subdirectory plus the resolved top-level path.
//! - Cache and filesystem failures.
//!
//! Existing cache entries are never validated; corruption detection is out
//! of scope.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for sourcelink operations
#[derive(Error, Debug)]
pub enum Error {
    /// A reference string did not match any supported grammar.
    ///
    /// Includes the offending reference and optionally a hint naming the
    /// expected grammar.
    #[error("Reference parse error for '{reference}': {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ReferenceParse {
        reference: String,
        message: String,
        /// Optional hint naming the expected grammar
        hint: Option<String>,
    },

    /// An error occurred while parsing a module manifest.
    #[error("Manifest parse error for {path}: {message}")]
    ManifestParse { path: String, message: String },

    /// An error occurred while cloning a Git repository.
    ///
    /// Includes the repository URL, ref (branch/tag), error message, and an
    /// optional hint for resolution.
    #[error("Git clone error for {url}@{r#ref}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        r#ref: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// An error occurred while executing a Git command.
    #[error("Git command failed for {url}: {command} - {stderr}")]
    GitCommand {
        command: String,
        url: String,
        stderr: String,
    },

    /// A requested subdirectory was absent from the fetched content.
    ///
    /// Carries the resolved top-level path so the caller can inspect what
    /// the fetch actually produced.
    #[error("Subdirectory '{subdirectory}' not found in {url}@{r#ref} (resolved root: {resolved_root})")]
    MissingSubdirectory {
        url: String,
        r#ref: String,
        subdirectory: String,
        resolved_root: String,
    },

    /// A locally referenced path does not exist.
    #[error("Path does not exist: {}", path.display())]
    PathNotFound { path: PathBuf },

    /// An error occurred with a cache operation.
    #[error("Cache operation error: {message}")]
    Cache { message: String },

    /// An error occurred during a network operation.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// A URL scheme no backend knows how to fetch.
    #[error("Unsupported source scheme '{scheme}' in {url}")]
    UnsupportedScheme { scheme: String, url: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// An HTTP client error, wrapped from `reqwest::Error`.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
