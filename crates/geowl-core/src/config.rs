//! Whitelist configuration.
//!
//! The whitelist file lists individual addresses, CIDR ranges and geo
//! entries:
//!
//! ```yaml
//! ip:
//!   - 203.0.113.7
//!   - 10.0.0.0/8        # entries with a '/' are ranges
//! cidr:
//!   - 2001:db8::/32
//! geo:
//!   - US/California
//!   - US/Oregon
//!   - FR
//! ```
//!
//! Bad entries are skipped with a warning. A file where nothing survives is
//! a fatal error, since it would deny every request forever.

use crate::{
    classify, AddressRange, GeoPolicyTable, GeoRule, GeoWlError, Result, StaticWhitelist,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Raw whitelist lists as written in configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhitelistConfig {
    /// Individual addresses; entries containing '/' are treated as ranges
    #[serde(default)]
    pub ip: Vec<String>,

    /// CIDR ranges
    #[serde(default)]
    pub cidr: Vec<String>,

    /// `COUNTRY` or `COUNTRY/REGION` entries
    #[serde(default)]
    pub geo: Vec<String>,
}

/// Immutable snapshot of every policy source
///
/// Replaced as a whole when the whitelist changes, never edited in place.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    /// Static IP and CIDR whitelist
    pub whitelist: StaticWhitelist,
    /// Geo allow-list
    pub geo: GeoPolicyTable,
}

impl AccessPolicy {
    /// Bundle a whitelist and geo table
    #[must_use]
    pub const fn new(whitelist: StaticWhitelist, geo: GeoPolicyTable) -> Self {
        Self { whitelist, geo }
    }

    /// Returns true if no source can ever allow an address
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.whitelist.is_empty() && self.geo.is_empty()
    }
}

/// Outcome of compiling a [`WhitelistConfig`]
#[derive(Debug)]
pub struct CompiledWhitelist {
    /// Policy built from the entries that parsed
    pub policy: AccessPolicy,
    /// One [`GeoWlError::Config`] per skipped entry
    pub skipped: Vec<GeoWlError>,
}

impl WhitelistConfig {
    /// Load a whitelist from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a whitelist from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Build the policy, skipping malformed entries
    #[must_use]
    pub fn compile(&self) -> CompiledWhitelist {
        let mut whitelist = StaticWhitelist::new();
        let mut geo = GeoPolicyTable::new();
        let mut skipped = Vec::new();

        let ranges = self
            .ip
            .iter()
            .filter(|entry| entry.contains('/'))
            .chain(self.cidr.iter());

        for entry in self.ip.iter().filter(|entry| !entry.contains('/')) {
            match classify(entry) {
                Ok(addr) => whitelist = whitelist.with_address(addr),
                Err(_) => skipped.push(GeoWlError::Config(format!(
                    "whitelisted IP {entry:?} is not a valid address"
                ))),
            }
        }

        for entry in ranges {
            match AddressRange::parse(entry) {
                Ok(range) => whitelist = whitelist.with_range(range),
                Err(e) => skipped.push(e),
            }
        }

        for entry in &self.geo {
            match GeoRule::parse(entry) {
                Ok(rule) => geo.insert(rule),
                Err(e) => skipped.push(e),
            }
        }

        for err in &skipped {
            warn!(error = %err, "skipping whitelist entry");
        }
        debug!(
            addresses = whitelist.address_count(),
            ranges = whitelist.ranges().len(),
            countries = geo.countries().count(),
            skipped = skipped.len(),
            "whitelist compiled"
        );

        CompiledWhitelist {
            policy: AccessPolicy::new(whitelist, geo),
            skipped,
        }
    }

    /// Build the policy, failing if no entry survived
    pub fn build_policy(&self) -> Result<AccessPolicy> {
        let compiled = self.compile();
        if compiled.policy.is_empty() {
            return Err(GeoWlError::EmptyWhitelist);
        }
        Ok(compiled.policy)
    }
}
