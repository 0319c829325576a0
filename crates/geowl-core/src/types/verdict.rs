use crate::policy::GeoOutcome;

/// Why an address was allowed or denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Input was not an IP address
    InvalidAddress,
    /// Loopback or link-local
    Bypass,
    /// Unspecified or multicast
    Rejected,
    /// Listed in the individual address whitelist
    StaticAddress,
    /// Inside a whitelisted range
    StaticRange,
    /// Answered from the decision cache
    Cached,
    /// Location permitted by the geo table
    GeoAllowed,
    /// Country not in the geo table
    CountryDenied,
    /// Country is region-restricted and the region is not listed
    RegionDenied,
    /// Country is region-restricted and the geo service gave no region
    RegionUnknown,
    /// Geo service failed, timed out or gave no country
    LookupFailed,
    /// No geo rules are configured
    NoGeoPolicy,
}

impl Reason {
    /// Returns true if the decision was reached without cache or network I/O
    #[must_use]
    pub const fn is_fast_path(self) -> bool {
        matches!(self, Self::InvalidAddress | Self::Bypass | Self::Rejected)
    }
}

impl From<GeoOutcome> for Reason {
    fn from(outcome: GeoOutcome) -> Self {
        match outcome {
            GeoOutcome::Allowed => Self::GeoAllowed,
            GeoOutcome::CountryDenied => Self::CountryDenied,
            GeoOutcome::RegionDenied => Self::RegionDenied,
            GeoOutcome::RegionUnknown => Self::RegionUnknown,
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::InvalidAddress => "invalid address",
            Self::Bypass => "loopback or link-local",
            Self::Rejected => "unspecified or multicast",
            Self::StaticAddress => "in IP whitelist",
            Self::StaticRange => "in CIDR whitelist",
            Self::Cached => "cached decision",
            Self::GeoAllowed => "location whitelisted",
            Self::CountryDenied => "country not whitelisted",
            Self::RegionDenied => "region not whitelisted",
            Self::RegionUnknown => "no region for region-restricted country",
            Self::LookupFailed => "geo lookup failed",
            Self::NoGeoPolicy => "no geo whitelist",
        };
        f.write_str(text)
    }
}

/// Final answer for one address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the client may pass
    pub allowed: bool,
    /// What decided it
    pub reason: Reason,
}

impl Verdict {
    /// An allowing verdict
    #[must_use]
    pub const fn allow(reason: Reason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    /// A denying verdict
    #[must_use]
    pub const fn deny(reason: Reason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }

    /// A verdict read back from the decision cache
    #[must_use]
    pub const fn cached(allowed: bool) -> Self {
        Self {
            allowed,
            reason: Reason::Cached,
        }
    }
}

impl From<GeoOutcome> for Verdict {
    fn from(outcome: GeoOutcome) -> Self {
        Self {
            allowed: outcome.is_allowed(),
            reason: outcome.into(),
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let word = if self.allowed { "ALLOW" } else { "DENY" };
        write!(f, "{word} ({})", self.reason)
    }
}
