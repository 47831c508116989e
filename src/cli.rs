//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Sourcelink - Resolve source references and module dependencies
#[derive(Parser, Debug)]
#[command(name = "sourcelink")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a reference string to a local path
    Resolve(commands::resolve::ResolveArgs),

    /// Resolve a manifest's module dependencies into a namespace
    Modules(commands::modules::ModulesArgs),

    /// Inspect the content cache
    Cache(commands::cache::CacheArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::new()
            .parse_filters(&self.log_level)
            .init();

        match self.command {
            Commands::Resolve(args) => commands::resolve::execute(args),
            Commands::Modules(args) => commands::modules::execute(args),
            Commands::Cache(args) => commands::cache::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
