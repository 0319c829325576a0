//! HTTP geolocation resolver for geowl.
//!
//! This crate provides [`GeoClient`], a [`geowl_core::GeoLookup`]
//! implementation for geojs-compatible services.

#![doc(html_root_url = "https://docs.rs/geowl-client/0.3.0")]

mod client;
mod config;

pub use client::{GeoClient, GeoClientBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use config::*;
pub use geowl_core::{GeoWlError, Result};
