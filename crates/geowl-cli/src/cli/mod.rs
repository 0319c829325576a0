//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;

use crate::logging;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.log_level.as_deref());

    let ctx = commands::Context {
        config_path: cli.config,
        whitelist_path: cli.whitelist,
    };

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(ctx, args).await,
        Commands::Check(args) => commands::check::execute(ctx, args).await,
    }
}
