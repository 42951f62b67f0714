//! Echelon CLI - versioned schema migrations

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, GlobalArgs};
use commands::{backfill, diff, down, init, new, up};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.global);

    match &cli.command {
        cli::Commands::Init(args) => init::execute(args, &cli.global),
        cli::Commands::Up(args) => up::execute(args, &cli.global),
        cli::Commands::Down(args) => down::execute(args, &cli.global),
        cli::Commands::Diff(args) => diff::execute(args, &cli.global),
        cli::Commands::Backfill(args) => backfill::execute(args, &cli.global),
        cli::Commands::New(args) => new::execute(args, &cli.global),
    }
}

/// Log to stderr at info, or debug with `--verbose`; `RUST_LOG` wins.
fn init_logging(global: &GlobalArgs) {
    let default_level = if global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
