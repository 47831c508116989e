//! # Source Reference Grammars
//!
//! This module defines the typed descriptors produced from raw reference
//! strings, and the parsing logic for the two grammars the library accepts.
//!
//! ## Key Components
//!
//! - **`SourceReference`**: A tagged union over every supported reference
//!   kind (git, absolute path, http, generic object store). The fetch
//!   dispatch in the resolver matches exhaustively over this enum, so adding
//!   a kind is a compile-enforced change.
//!
//! - **`GitSource`**: The lenient git-flavored descriptor used for module
//!   declarations in manifests, where a missing `@ref` means the remote's
//!   default branch (HEAD).
//!
//! ## Parsing
//!
//! `SourceReference::parse` applies the grammar rules in priority order:
//!
//! 1. A string prefixed with `git+` is a git reference and must contain an
//!    `@ref` separator. A subdirectory can be spelled as a trailing `/path`
//!    after the ref or as an explicit `#subdirectory=path` suffix; the
//!    fragment spelling is extracted before the `/`-style split and may
//!    appear on either side of the `@`.
//! 2. A filesystem-absolute string is an absolute-path reference.
//! 3. A string beginning with `http://` or `https://` is an http reference.
//! 4. Anything else is a generic object-store reference.
//!
//! Malformed input produces a typed [`Error::ReferenceParse`], never a
//! silent fallback to a local path.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Prefix marking a git-flavored reference
pub const GIT_MARKER: &str = "git+";

/// Fragment key spelling a subdirectory inside a git reference
const SUBDIRECTORY_FRAGMENT: &str = "#subdirectory=";

/// A parsed reference, one variant per supported origin scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceReference {
    /// A version-controlled repository at a mandatory ref, with an optional
    /// subdirectory inside the checked-out tree.
    Git {
        url: String,
        r#ref: String,
        subdirectory: Option<String>,
    },
    /// A local absolute path; checked for existence, never cached.
    AbsolutePath(PathBuf),
    /// A downloadable `http://` or `https://` endpoint.
    Http(String),
    /// Any other remote-filesystem-style URL, handed to the object-store
    /// backend.
    ObjectStore(String),
}

impl SourceReference {
    /// Parse a raw reference string into a typed descriptor.
    pub fn parse(reference: &str) -> Result<Self> {
        if let Some(rest) = reference.strip_prefix(GIT_MARKER) {
            let (url, r#ref, subdirectory) = parse_git_parts(reference, rest, true)?;
            // Invariant: ref is mandatory for the git kind
            let r#ref = r#ref.ok_or_else(|| missing_ref_error(reference))?;
            return Ok(SourceReference::Git {
                url,
                r#ref,
                subdirectory,
            });
        }

        if Path::new(reference).is_absolute() {
            return Ok(SourceReference::AbsolutePath(PathBuf::from(reference)));
        }

        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(SourceReference::Http(reference.to_string()));
        }

        Ok(SourceReference::ObjectStore(reference.to_string()))
    }

    /// Short scheme name, for logging and listings.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceReference::Git { .. } => "git",
            SourceReference::AbsolutePath(_) => "path",
            SourceReference::Http(_) => "http",
            SourceReference::ObjectStore(_) => "object-store",
        }
    }
}

/// A git-flavored module source, as declared in manifests.
///
/// Unlike [`SourceReference::Git`], the ref is optional: module resolution
/// falls back to the remote's default branch when no `@ref` is spelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSource {
    pub url: String,
    pub reference: Option<String>,
    pub subdirectory: Option<String>,
}

impl GitSource {
    /// Parse a module source string. The `git+` prefix is accepted but not
    /// required.
    pub fn parse(source: &str) -> Result<Self> {
        let rest = source.strip_prefix(GIT_MARKER).unwrap_or(source);
        let (url, reference, subdirectory) = parse_git_parts(source, rest, false)?;
        Ok(GitSource {
            url,
            reference,
            subdirectory,
        })
    }
}

/// Split the body of a git reference into `(url, ref, subdirectory)`.
///
/// The `#subdirectory=` fragment is extracted first. When the fragment sits
/// before the `@` separator, the ref is recovered from the tail of the
/// fragment value; otherwise the value runs to the end of the string. Without
/// a fragment, the ref's first `/` starts the subdirectory, which means refs
/// containing slashes (e.g. `feature/x`) need the fragment spelling.
fn parse_git_parts(
    original: &str,
    body: &str,
    require_ref: bool,
) -> Result<(String, Option<String>, Option<String>)> {
    let mut fragment_subdir: Option<String> = None;
    let mut remainder = body.to_string();

    if let Some(idx) = body.find(SUBDIRECTORY_FRAGMENT) {
        let before = &body[..idx];
        let value = &body[idx + SUBDIRECTORY_FRAGMENT.len()..];
        if before.contains('@') {
            fragment_subdir = normalize_subdirectory(value);
            remainder = before.to_string();
        } else if let Some((sub, ref_part)) = value.rsplit_once('@') {
            // subdirectory spelled before the ref separator
            fragment_subdir = normalize_subdirectory(sub);
            remainder = format!("{}@{}", before, ref_part);
        } else {
            fragment_subdir = normalize_subdirectory(value);
            remainder = before.to_string();
        }
    }

    let (url, ref_part) = match remainder.rsplit_once('@') {
        Some((url, ref_part)) => (url.to_string(), Some(ref_part.to_string())),
        None => (remainder.clone(), None),
    };

    if url.is_empty() {
        return Err(Error::ReferenceParse {
            reference: original.to_string(),
            message: "empty repository location".to_string(),
            hint: Some(expected_grammar().to_string()),
        });
    }

    if require_ref && ref_part.as_deref().is_none_or(str::is_empty) {
        return Err(missing_ref_error(original));
    }

    let (r#ref, subdirectory) = match ref_part {
        Some(ref_part) if fragment_subdir.is_none() => match ref_part.split_once('/') {
            Some((r, sub)) => (
                nonempty(r).map(str::to_string),
                normalize_subdirectory(sub),
            ),
            None => (nonempty(&ref_part).map(str::to_string), None),
        },
        Some(ref_part) => (nonempty(&ref_part).map(str::to_string), fragment_subdir),
        None => (None, fragment_subdir),
    };

    if require_ref && r#ref.is_none() {
        return Err(missing_ref_error(original));
    }

    Ok((url, r#ref, subdirectory))
}

fn nonempty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn normalize_subdirectory(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn missing_ref_error(reference: &str) -> Error {
    Error::ReferenceParse {
        reference: reference.to_string(),
        message: "missing '@ref' separator".to_string(),
        hint: Some(expected_grammar().to_string()),
    }
}

fn expected_grammar() -> &'static str {
    "expected git+<url>@<ref>[/<subdirectory>] or git+<url>@<ref>#subdirectory=<path>"
}
