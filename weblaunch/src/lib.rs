//! weblaunch CLI library: argument parsing and command dispatch.

mod cli;
pub mod commands;
pub mod launcher;
pub mod report;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use weblaunch_core::config::{LaunchConfig, LaunchOverrides};
use weblaunch_core::observability;

/// Run the CLI. Returns the process exit code.
pub fn run_cli() -> Result<i32> {
    let cli = Cli::parse();
    observability::init_tracing();

    let config = LaunchConfig::from_env().with_cli_overrides(LaunchOverrides::from(cli.launch));
    tracing::debug!(?config, "Resolved configuration");

    match cli.command.unwrap_or(Commands::Launch) {
        Commands::Launch => commands::launch::cmd_launch(config),
        Commands::Check { json } => commands::check::cmd_check(&config, json),
    }
}
