//! geowl - IP and geolocation whitelist gate
//!
//! Answers `auth_request`-style subrequests and checks addresses by hand.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    geowl_cli::run().await
}
