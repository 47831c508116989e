//! Resolve command implementation
//!
//! Resolves a single reference string to a local path and prints it. The
//! reference may use any of the supported grammars: `git+<url>@<ref>` with
//! an optional subdirectory, an absolute filesystem path, an `http(s)://`
//! endpoint, or a generic object-store URL.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use sourcelink::defaults;
use sourcelink::resolver::ReferenceResolver;

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// The reference to resolve
    #[arg(value_name = "REFERENCE")]
    pub reference: String,

    /// Cache root directory
    #[arg(long, value_name = "DIR", env = "SOURCELINK_CACHE")]
    pub cache_root: Option<PathBuf>,
}

/// Execute the resolve command
pub fn execute(args: ResolveArgs) -> Result<()> {
    let cache_root = args
        .cache_root
        .unwrap_or_else(defaults::default_cache_root);

    let resolver = ReferenceResolver::new(cache_root);
    let path = resolver
        .resolve(&args.reference)
        .with_context(|| format!("failed to resolve '{}'", args.reference))?;

    println!("{}", path.display());
    Ok(())
}
