//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

/// IP and geolocation whitelist gate
///
/// Lets a client through if its address is whitelisted, falls in a
/// whitelisted range, or geolocates to a whitelisted country or region.
#[derive(Parser, Debug)]
#[command(name = "geowl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Engine configuration file
    #[arg(
        short,
        long,
        env = "GEOWL_CONFIG",
        default_value = "config.yaml",
        global = true
    )]
    pub config: PathBuf,

    /// Whitelist file
    #[arg(
        short,
        long,
        env = "GEOWL_WHITELIST",
        default_value = "whitelist.yaml",
        global = true
    )]
    pub whitelist: PathBuf,

    /// Log filter, e.g. "debug" or "geowl=debug" (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer HTTP subrequests with 200 or 403
    Serve(ServeArgs),

    /// Decide for the given addresses and print the reason
    Check(CheckArgs),
}

// ============================================================================
// Serve command
// ============================================================================

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address (overrides `listen` in the config file)
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,
}

// ============================================================================
// Check command
// ============================================================================

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Addresses to check
    #[arg(required = true)]
    pub addresses: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// How `check` prints verdicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One colored line per address
    Pretty,
    /// One JSON object per line
    Json,
}
