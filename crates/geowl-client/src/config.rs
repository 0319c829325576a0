//! Client configuration types.

use std::num::NonZeroU32;

/// Outbound rate limit for geo lookups
///
/// Public geo services are shared infrastructure; a burst of new client
/// addresses should queue rather than hammer the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,

    /// Requests allowed back-to-back before throttling starts
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitConfig {
    /// Create a rate limit of 10 requests per second with a burst of 20
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 20,
        }
    }

    /// Set sustained requests per second
    #[must_use]
    pub const fn requests_per_second(mut self, rps: u32) -> Self {
        self.requests_per_second = rps;
        self
    }

    /// Set burst size
    #[must_use]
    pub const fn burst_size(mut self, burst: u32) -> Self {
        self.burst_size = burst;
        self
    }

    /// Build the governor quota, clamping zero values to one
    #[must_use]
    pub fn quota(&self) -> governor::Quota {
        let rate = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN);
        governor::Quota::per_second(rate).allow_burst(burst)
    }
}
