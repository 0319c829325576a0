//! Engine configuration.

use geowl_client::RateLimitConfig;
use geowl_core::{GeoWlError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Configuration for a geowl gate (`config.yaml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long geo-resolved decisions stay cached, in seconds (default: 3 hours).
    #[serde(default = "default_cache_expiry")]
    pub cache_expiry: u64,

    /// Geo service base URL; the address is appended as a path segment.
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Upper bound on one geo lookup, in seconds.
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout: u64,

    /// HTTP listen address for the front end (default: 0.0.0.0:9500).
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Shared Redis cache; the in-process cache is used when disabled.
    #[serde(default)]
    pub redis: RedisConfig,

    /// Outbound geo lookup throttle; unthrottled when absent.
    #[serde(default)]
    pub rate_limit: Option<RateLimitSettings>,
}

/// Redis connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Use Redis for the decision cache.
    #[serde(default)]
    pub enabled: bool,

    /// Redis host (default: 127.0.0.1).
    #[serde(default = "default_redis_host")]
    pub host: String,

    /// Redis port (default: 6379).
    #[serde(default = "default_redis_port")]
    pub port: u16,

    /// Redis database index (default: 0).
    #[serde(default)]
    pub db: i64,

    /// Optional password.
    #[serde(default)]
    pub password: Option<String>,

    /// Prepended to every cache key.
    #[serde(default)]
    pub key_prefix: String,
}

/// Outbound lookup rate limit as written in configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Sustained lookups per second.
    pub requests_per_second: u32,

    /// Lookups allowed back-to-back.
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_expiry: default_cache_expiry(),
            service_url: default_service_url(),
            lookup_timeout: default_lookup_timeout(),
            listen: default_listen(),
            redis: RedisConfig::default(),
            rate_limit: None,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_redis_host(),
            port: default_redis_port(),
            db: 0,
            password: None,
            key_prefix: String::new(),
        }
    }
}

impl RedisConfig {
    /// Connection URL for the redis client.
    #[must_use]
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{password}@{}:{}/{}",
                self.host, self.port, self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

impl From<RateLimitSettings> for RateLimitConfig {
    fn from(settings: RateLimitSettings) -> Self {
        Self::new()
            .requests_per_second(settings.requests_per_second)
            .burst_size(settings.burst_size)
    }
}

impl EngineConfig {
    /// Load config from a YAML file, falling back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_yaml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every geo decision a deny.
    pub fn validate(&self) -> Result<()> {
        if self.cache_expiry == 0 {
            return Err(GeoWlError::Config(
                "cache_expiry must be at least 1 second".into(),
            ));
        }
        if self.lookup_timeout == 0 {
            return Err(GeoWlError::Config(
                "lookup_timeout must be at least 1 second".into(),
            ));
        }
        Ok(())
    }

    /// Cache TTL as a duration.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_expiry)
    }

    /// Geo lookup bound as a duration.
    #[must_use]
    pub const fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout)
    }
}

// Default value functions for serde.
const fn default_cache_expiry() -> u64 {
    60 * 180
}

fn default_service_url() -> String {
    String::from(geowl_client::DEFAULT_BASE_URL)
}

const fn default_lookup_timeout() -> u64 {
    5
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 9500))
}

fn default_redis_host() -> String {
    String::from("127.0.0.1")
}

const fn default_redis_port() -> u16 {
    6379
}

const fn default_burst() -> u32 {
    20
}
