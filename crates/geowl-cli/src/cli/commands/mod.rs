//! Command implementations.

pub mod check;
pub mod serve;

use anyhow::{Context as _, Result};
use geowl::{EngineConfig, Gatekeeper, WhitelistConfig};
use std::path::PathBuf;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Engine configuration file; defaults apply if it does not exist
    pub config_path: PathBuf,

    /// Whitelist file; must exist
    pub whitelist_path: PathBuf,
}

impl Context {
    /// Load the engine configuration.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        EngineConfig::load(&self.config_path)
            .with_context(|| format!("reading config {}", self.config_path.display()))
    }

    /// Load the whitelist.
    pub fn whitelist(&self) -> Result<WhitelistConfig> {
        WhitelistConfig::load(&self.whitelist_path)
            .with_context(|| format!("reading whitelist {}", self.whitelist_path.display()))
    }

    /// Build a gatekeeper from both files.
    pub async fn gatekeeper(&self, engine: &EngineConfig) -> Result<Gatekeeper> {
        let whitelist = self.whitelist()?;
        Gatekeeper::from_config(engine, &whitelist)
            .await
            .with_context(|| format!("loading whitelist {}", self.whitelist_path.display()))
    }
}
