use std::time::Duration;
use thiserror::Error;

/// Result type alias for geowl operations
pub type Result<T> = std::result::Result<T, GeoWlError>;

/// Errors that can occur while deciding whether an address may pass
#[derive(Error, Debug)]
pub enum GeoWlError {
    /// Input is not an IP address
    #[error("invalid IP address: {0:?}")]
    InvalidAddress(String),

    /// HTTP request to the geo service failed
    #[error("geo lookup request failed: {0}")]
    Http(String),

    /// Geo service answered with a non-success status
    #[error("geo service returned status {code}")]
    Status {
        /// HTTP status code
        code: u16,
    },

    /// Geo service answered with a body that is not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Geo service answered without a country code
    #[error("geo service returned no country code for {addr}")]
    MissingCountryCode {
        /// Canonical address that was looked up
        addr: String,
    },

    /// Geo lookup did not finish in time
    #[error("geo lookup timed out after {0:?}")]
    Timeout(Duration),

    /// A single whitelist entry or config value is unusable
    #[error("configuration error: {0}")]
    Config(String),

    /// No IP, CIDR or geo entry survived whitelist compilation
    #[error("whitelist is empty: at least one IP, CIDR or geo entry is required")]
    EmptyWhitelist,

    /// Decision cache backend is unreachable or misbehaving
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeoWlError {
    /// Returns true if the error came from resolving an address to a location
    #[must_use]
    pub const fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Status { .. }
                | Self::Json(_)
                | Self::MissingCountryCode { .. }
                | Self::Timeout(_)
        )
    }

    /// Returns true if the error must stop the process at startup
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::EmptyWhitelist | Self::Io(_) | Self::Yaml(_))
    }

    /// Returns the HTTP status code if the geo service answered with one
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code } => Some(*code),
            _ => None,
        }
    }
}
