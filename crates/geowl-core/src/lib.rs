//! Core types for the geowl access gate.
//!
//! This crate holds everything that decides without doing I/O:
//!
//! - **Address classification**: [`classify`], [`is_bypass`], [`is_reject`]
//! - **Static whitelists**: [`StaticWhitelist`] of addresses and [`AddressRange`]s
//! - **Geo policy**: [`GeoPolicyTable`] built from [`GeoRule`]s
//! - **Configuration**: [`WhitelistConfig`] compiled into an [`AccessPolicy`]
//! - **Errors**: [`GeoWlError`] and the [`Result`] alias
//!
//! The [`GeoLookup`] trait is the seam to the network-bound geo resolver.
//!
//! # Example
//!
//! ```rust,ignore
//! use geowl_core::{classify, GeoPolicyTable, GeoRule};
//!
//! let table: GeoPolicyTable = [GeoRule::region("US", "Oregon")].into_iter().collect();
//! let addr = classify("203.0.113.9")?;
//! assert!(table.permits("US", Some("Oregon")));
//! ```

#![doc(html_root_url = "https://docs.rs/geowl-core/0.3.0")]

mod address;
pub mod config;
mod error;
mod lookup;
pub mod policy;
pub mod types;
pub mod whitelist;

pub use address::{classify, is_bypass, is_reject, Address};
pub use config::{AccessPolicy, CompiledWhitelist, WhitelistConfig};
pub use error::{GeoWlError, Result};
pub use lookup::GeoLookup;
pub use policy::{GeoOutcome, GeoPolicyTable, GeoRule};
pub use types::*;
pub use whitelist::{AddressRange, StaticMatch, StaticWhitelist};
