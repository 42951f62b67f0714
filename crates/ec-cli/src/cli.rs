//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Echelon - versioned schema migrations
#[derive(Parser, Debug)]
#[command(name = "echelon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Print every statement migrations execute
    #[arg(long, global = true)]
    pub analyze: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the schema_migrations table and the migrations directory
    Init(InitArgs),

    /// Apply all unapplied migrations
    Up(UpArgs),

    /// Roll back applied migrations newer than a target version
    Down(DownArgs),

    /// Compare migration files with the applied versions
    Diff(DiffArgs),

    /// Record all migrations as applied without running them
    Backfill(BackfillArgs),

    /// Create a new, empty SQL migration file
    New(NewArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {}

/// Arguments for the up command
#[derive(Args, Debug)]
pub struct UpArgs {}

/// Arguments for the down command
#[derive(Args, Debug)]
pub struct DownArgs {
    /// Version to roll back to; it and everything older stay applied
    pub target_version: String,
}

/// Arguments for the diff command
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: DiffOutput,
}

/// Diff output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOutput {
    /// Human-readable listing
    Table,
    /// JSON object with `unapplied` and `unknown` arrays
    Json,
}

/// Arguments for the backfill command
#[derive(Args, Debug)]
pub struct BackfillArgs {}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Migration name (letters, digits and underscores)
    pub name: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
