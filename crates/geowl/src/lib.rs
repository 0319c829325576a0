//! IP and geolocation whitelist gate.
//!
//! Decides whether a client, identified by its IP address, may reach a
//! protected resource. Static IP and CIDR whitelists are checked first;
//! everything else is resolved through a geolocation service and checked
//! against a country/region whitelist, with the outcome cached for a while.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use geowl::{EngineConfig, Gatekeeper, WhitelistConfig};
//!
//! #[tokio::main]
//! async fn main() -> geowl::Result<()> {
//!     let engine = EngineConfig::load("config.yaml".as_ref())?;
//!     let whitelist = WhitelistConfig::load("whitelist.yaml".as_ref())?;
//!     let gate = Gatekeeper::from_config(&engine, &whitelist).await?;
//!
//!     if gate.decide("8.8.8.8").await {
//!         println!("come in");
//!     }
//!
//!     let verdict = gate.evaluate("10.1.2.3").await;
//!     println!("{verdict}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/geowl/0.3.0")]

mod bootstrap;
pub mod config;
mod flight;
mod pipeline;

pub use bootstrap::{build_cache, build_resolver};
pub use config::{EngineConfig, RateLimitSettings, RedisConfig};
pub use pipeline::{
    Gatekeeper, GatekeeperBuilder, DEFAULT_CACHE_TIMEOUT, DEFAULT_CACHE_TTL,
    DEFAULT_LOOKUP_TIMEOUT,
};

// Re-export core types
pub use geowl_core::*;

// Re-export backends
pub use geowl_cache::{DecisionCache, MemoryCache, RedisCache, RedisCacheConfig};
pub use geowl_client::{GeoClient, GeoClientBuilder, RateLimitConfig};

// Re-export runtime for convenience
pub use tokio;
