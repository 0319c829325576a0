//! Static IP and CIDR whitelists.

use crate::{Address, GeoWlError, Result};
use ipnetwork::IpNetwork;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A network prefix such as `10.0.0.0/8` or `2001:db8::/32`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    network: IpNetwork,
}

impl AddressRange {
    /// Parse a CIDR string
    ///
    /// Host bits must be zero: `10.0.0.1/8` is refused rather than silently
    /// widened to `10.0.0.0/8`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let network: IpNetwork = trimmed
            .parse()
            .map_err(|e| GeoWlError::Config(format!("invalid CIDR range {trimmed:?}: {e}")))?;

        if network.ip() != network.network() {
            return Err(GeoWlError::Config(format!(
                "CIDR range {trimmed:?} has host bits set"
            )));
        }

        Ok(Self { network })
    }

    /// Returns true if the address falls inside this range
    ///
    /// An IPv4 address is never inside an IPv6 range and vice versa.
    #[must_use]
    pub fn contains(&self, addr: &Address) -> bool {
        self.network.contains(addr.ip())
    }

    /// Prefix length in bits
    #[must_use]
    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }
}

impl FromStr for AddressRange {
    type Err = GeoWlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.network)
    }
}

/// Which static list matched an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticMatch {
    /// Listed as an individual address
    Exact,
    /// Inside a configured range
    Range(AddressRange),
}

/// Individually whitelisted addresses plus whitelisted ranges
///
/// Built once from configuration and never mutated afterwards; a new
/// whitelist replaces the old one as a whole.
#[derive(Debug, Clone, Default)]
pub struct StaticWhitelist {
    addresses: HashSet<Address>,
    ranges: Vec<AddressRange>,
}

impl StaticWhitelist {
    /// Create an empty whitelist
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an individual address
    #[must_use]
    pub fn with_address(mut self, addr: Address) -> Self {
        self.addresses.insert(addr);
        self
    }

    /// Append a range, kept in configuration order
    #[must_use]
    pub fn with_range(mut self, range: AddressRange) -> Self {
        if !self.ranges.contains(&range) {
            self.ranges.push(range);
        }
        self
    }

    /// Find which list, if any, admits the address
    #[must_use]
    pub fn matches(&self, addr: &Address) -> Option<StaticMatch> {
        if self.addresses.contains(addr) {
            return Some(StaticMatch::Exact);
        }

        self.ranges
            .iter()
            .find(|range| range.contains(addr))
            .map(|range| StaticMatch::Range(*range))
    }

    /// Returns true if the address is whitelisted by either list
    #[must_use]
    pub fn contains(&self, addr: &Address) -> bool {
        self.matches(addr).is_some()
    }

    /// Number of individual addresses
    #[must_use]
    pub fn address_count(&self) -> usize {
        self.addresses.len()
    }

    /// Configured ranges in order
    #[must_use]
    pub fn ranges(&self) -> &[AddressRange] {
        &self.ranges
    }

    /// Returns true if neither list has entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty() && self.ranges.is_empty()
    }
}
