//! Command-line argument definitions.

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the opencode settings sync engine.
#[derive(Parser, Debug)]
#[command(
    name = "opsync",
    about = "Sync opencode credentials and configuration to remote targets",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Path to the sync specification (skips discovery)
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Preview changes without writing to the secret store or disk
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build bundles and push them to the secret store
    Sync(SyncOpts),
    /// Restore a bundle payload into the local tree
    Restore(RestoreOpts),
    /// List the targets declared in the sync specification
    Targets,
    /// Print version information
    Version,
}

/// Options for the `sync` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct SyncOpts {
    /// Sync a single named target instead of all declared targets
    #[arg(short, long)]
    pub target: Option<String>,
}

/// Options for the `restore` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RestoreOpts {
    /// File holding the base64 payload; reads standard input when omitted
    #[arg(short, long)]
    pub input: Option<std::path::PathBuf>,
}
