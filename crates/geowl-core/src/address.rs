//! Address classification.
//!
//! Every decision starts by turning the caller-supplied string into an
//! [`Address`]. Loopback and link-local addresses are let through without
//! further checks, unspecified and multicast addresses are refused, and
//! everything else goes on to the whitelists.

use crate::{GeoWlError, Result};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// A parsed IP address with its canonical text form
///
/// The canonical form is the compressed RFC 5952 spelling for IPv6 and the
/// dotted quad for IPv4. IPv4-mapped IPv6 addresses collapse to the IPv4
/// address they carry, so `::ffff:192.0.2.1` and `192.0.2.1` share one
/// cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    ip: IpAddr,
    canonical: String,
}

impl Address {
    /// Wrap an already parsed IP address
    #[must_use]
    pub fn from_ip(ip: IpAddr) -> Self {
        let ip = ip.to_canonical();
        Self {
            canonical: ip.to_string(),
            ip,
        }
    }

    /// The underlying IP address
    #[must_use]
    pub const fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Canonical string form, used as the cache key
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// True for 127.0.0.0/8 and ::1
    #[must_use]
    pub const fn is_loopback(&self) -> bool {
        self.ip.is_loopback()
    }

    /// True for 169.254.0.0/16 and fe80::/10
    #[must_use]
    pub const fn is_link_local(&self) -> bool {
        match self.ip {
            IpAddr::V4(v4) => v4.is_link_local(),
            IpAddr::V6(v6) => v6_link_local(&v6),
        }
    }

    /// True for RFC 1918 ranges and fc00::/7
    #[must_use]
    pub const fn is_private(&self) -> bool {
        match self.ip {
            IpAddr::V4(v4) => v4.is_private(),
            IpAddr::V6(v6) => (v6.segments()[0] & 0xfe00) == 0xfc00,
        }
    }

    /// True for 0.0.0.0 and ::
    #[must_use]
    pub const fn is_unspecified(&self) -> bool {
        self.ip.is_unspecified()
    }

    /// True for 224.0.0.0/4 and ff00::/8
    #[must_use]
    pub const fn is_multicast(&self) -> bool {
        self.ip.is_multicast()
    }

    /// Returns true if the address family is IPv4
    #[must_use]
    pub const fn is_ipv4(&self) -> bool {
        self.ip.is_ipv4()
    }
}

const fn v6_link_local(v6: &Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xffc0) == 0xfe80
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for Address {
    type Err = GeoWlError;

    fn from_str(s: &str) -> Result<Self> {
        classify(s)
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        Self::from_ip(ip)
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Self::from_ip(IpAddr::V4(ip))
    }
}

impl From<Ipv6Addr> for Address {
    fn from(ip: Ipv6Addr) -> Self {
        Self::from_ip(IpAddr::V6(ip))
    }
}

/// Parse a raw address string
///
/// Fails with [`GeoWlError::InvalidAddress`] for empty input, text that is
/// not an address, out-of-range or zero-padded octets, and zone-scoped IPv6
/// literals.
pub fn classify(raw: &str) -> Result<Address> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GeoWlError::InvalidAddress(raw.to_string()));
    }

    trimmed
        .parse::<IpAddr>()
        .map(Address::from_ip)
        .map_err(|_| GeoWlError::InvalidAddress(raw.to_string()))
}

/// Addresses that are always allowed without touching cache or network
#[must_use]
pub const fn is_bypass(addr: &Address) -> bool {
    addr.is_loopback() || addr.is_link_local()
}

/// Addresses that are always denied without touching cache or network
#[must_use]
pub const fn is_reject(addr: &Address) -> bool {
    addr.is_unspecified() || addr.is_multicast()
}
