//! # Module Manifest Schema and Parsing
//!
//! This module defines the data structures representing a module manifest
//! and the logic for parsing one. A manifest is YAML, optionally wrapped in
//! a `---`-delimited frontmatter block (manifests embedded at the top of a
//! profile document), declaring modules across three sections: `providers`,
//! `tools`, and `hooks`.
//!
//! Each declaration names a module and optionally carries a `source` field
//! holding a git-flavored reference. Declarations without a `source` are
//! assumed to be resolved elsewhere and are skipped without error.
//!
//! A manifest that fails to parse is the only manifest-level failure mode;
//! it aborts resolution of the whole file.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One declared module entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDeclaration {
    /// Module identifier, unique within its namespace
    pub module: String,
    /// Git-flavored reference to fetch the module from; absent means the
    /// module is provided by other means
    #[serde(default)]
    pub source: Option<String>,
}

/// The section a module was declared under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleType {
    Provider,
    Tool,
    Hook,
}

impl ModuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Provider => "provider",
            ModuleType::Tool => "tool",
            ModuleType::Hook => "hook",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed module manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleManifest {
    #[serde(default)]
    pub providers: Vec<ModuleDeclaration>,
    #[serde(default)]
    pub tools: Vec<ModuleDeclaration>,
    #[serde(default)]
    pub hooks: Vec<ModuleDeclaration>,
}

impl ModuleManifest {
    /// Parse manifest text, tolerating a frontmatter wrapper.
    pub fn parse(text: &str) -> Result<Self> {
        let document = extract_document(text);
        Ok(serde_yaml::from_str(document)?)
    }

    /// Load and parse a manifest file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::ManifestParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&text).map_err(|e| Error::ManifestParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Every declared module across all sections, tagged with its type.
    pub fn declared_modules(&self) -> Vec<(ModuleType, &ModuleDeclaration)> {
        let mut modules = Vec::new();
        modules.extend(self.providers.iter().map(|d| (ModuleType::Provider, d)));
        modules.extend(self.tools.iter().map(|d| (ModuleType::Tool, d)));
        modules.extend(self.hooks.iter().map(|d| (ModuleType::Hook, d)));
        modules
    }
}

/// Strip an optional leading `---` frontmatter fence so the YAML document
/// between the fences parses on its own. Text without a fence is returned
/// unchanged.
fn extract_document(text: &str) -> &str {
    let Some(after_open) = text.strip_prefix("---") else {
        return text;
    };
    let Some(body) = after_open
        .strip_prefix("\r\n")
        .or_else(|| after_open.strip_prefix('\n'))
    else {
        return text;
    };
    match body.find("\n---") {
        Some(end) => &body[..end],
        None => body,
    }
}
