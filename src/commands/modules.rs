//! Modules command implementation
//!
//! Resolves every module a manifest declares into a namespace and reports
//! one status per module: `resolved` (freshly fetched), `cached` (already
//! present), or `error`. A broken module never aborts its siblings, so the
//! command exits nonzero only when the manifest itself cannot be parsed or
//! when `--strict` is given and at least one module failed.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use sourcelink::defaults;
use sourcelink::modules::{ModuleResolver, ModuleStatus};

/// Arguments for the modules command
#[derive(Args, Debug)]
pub struct ModulesArgs {
    /// Path to the module manifest (YAML, optionally frontmatter-wrapped)
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Namespace to link resolved modules into
    #[arg(short, long, value_name = "NAME")]
    pub namespace: String,

    /// Cache root directory
    #[arg(long, value_name = "DIR", env = "SOURCELINK_CACHE")]
    pub cache_root: Option<PathBuf>,

    /// Root of the namespace symlink tree
    #[arg(long, value_name = "DIR", env = "SOURCELINK_MODULES")]
    pub modules_root: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Exit nonzero if any module failed to resolve
    #[arg(long)]
    pub strict: bool,
}

/// Execute the modules command
pub fn execute(args: ModulesArgs) -> Result<()> {
    let cache_root = args
        .cache_root
        .unwrap_or_else(defaults::default_cache_root);
    let modules_root = args
        .modules_root
        .unwrap_or_else(defaults::default_modules_root);

    let resolver = ModuleResolver::new(cache_root, modules_root);
    let statuses = resolver
        .resolve_manifest(&args.manifest, &args.namespace)
        .with_context(|| format!("failed to resolve manifest {}", args.manifest.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else if statuses.is_empty() {
        println!("No modules with sources declared.");
    } else {
        for (module_id, status) in &statuses {
            match status {
                ModuleStatus::Error(message) => {
                    println!("{:<24} {}  ({})", module_id, status, message)
                }
                _ => println!("{:<24} {}", module_id, status),
            }
        }
    }

    let failed = statuses
        .values()
        .filter(|s| matches!(s, ModuleStatus::Error(_)))
        .count();
    if args.strict && failed > 0 {
        bail!("{} module(s) failed to resolve", failed);
    }
    Ok(())
}
