//! Geo resolution interface.

use crate::{Address, GeoLookupResult, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves an address to a country and region
///
/// Implementations make a single attempt per call and report every failure
/// (transport, status, body, missing country) as an error; callers treat all
/// of them as a deny.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Look up the location of an address
    async fn resolve(&self, addr: &Address) -> Result<GeoLookupResult>;

    /// Short name of the provider for logs
    fn name(&self) -> &'static str {
        "geo"
    }
}

#[async_trait]
impl<T: GeoLookup + ?Sized> GeoLookup for Arc<T> {
    async fn resolve(&self, addr: &Address) -> Result<GeoLookupResult> {
        (**self).resolve(addr).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
