//! Decision cache for geowl.
//!
//! Geo-resolved decisions are cached per canonical address for a fixed
//! time-to-live. Two interchangeable backends implement [`DecisionCache`]:
//!
//! - [`MemoryCache`]: process-local, lost on restart
//! - [`RedisCache`]: shared across instances, survives restarts
//!
//! Both guarantee that an expired entry is never returned.

#![doc(html_root_url = "https://docs.rs/geowl-cache/0.3.0")]

pub mod clock;
mod error;
mod memory;
mod remote;

pub use clock::{Clock, SystemClock};
pub use error::{CacheError, CacheResult};
pub use memory::{CacheEntry, MemoryCache};
pub use remote::{decode_decision, encode_decision, ttl_seconds, RedisCache, RedisCacheConfig};

#[cfg(any(test, feature = "test-helpers"))]
pub use clock::MockClock;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Per-address store of allow/deny decisions with expiry
#[async_trait]
pub trait DecisionCache: Send + Sync {
    /// Cached decision for `key`, or `None` if absent or expired
    async fn get(&self, key: &str) -> CacheResult<Option<bool>>;

    /// Store `decision` under `key` until `ttl` from now, replacing any prior entry
    async fn put(&self, key: &str, decision: bool, ttl: Duration) -> CacheResult<()>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

#[async_trait]
impl<T: DecisionCache + ?Sized> DecisionCache for Arc<T> {
    async fn get(&self, key: &str) -> CacheResult<Option<bool>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, decision: bool, ttl: Duration) -> CacheResult<()> {
        (**self).put(key, decision, ttl).await
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}
