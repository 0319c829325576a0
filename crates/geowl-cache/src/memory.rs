//! In-process decision cache.
//!
//! Decisions live only as long as the process and are invisible to sibling
//! instances. Expiry is lazy: an expired entry is dropped the first time it
//! is read, and [`MemoryCache::purge_expired`] sweeps the rest, either on
//! demand or periodically from [`MemoryCache::spawn_sweeper`].
//!
//! TTLs are rounded up to whole seconds, the same as the Redis backend.

use crate::clock::{Clock, SystemClock};
use crate::remote::ttl_seconds;
use crate::{CacheResult, DecisionCache};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// One cached decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    /// Whether the address was allowed
    pub decision: bool,
    /// Instant after which the entry is no longer valid
    pub expires_at: Instant,
}

impl CacheEntry {
    /// Returns true once `now` has reached the expiry instant
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Concurrent in-process cache of decisions keyed by canonical address
#[derive(Debug)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    /// Create an empty cache using the system clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Create an empty cache reading time from `clock`
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Valid decision for `key`, evicting it if it has expired
    pub fn lookup(&self, key: &str) -> Option<bool> {
        let now = self.clock.now();
        let entry = self.entries.get(key).map(|entry| *entry)?;

        if !entry.is_expired(now) {
            return Some(entry.decision);
        }

        // A concurrent put may have refreshed the key since the read above
        self.entries.remove_if(key, |_, current| current.is_expired(now));
        debug!(key = %key, "expired entry evicted from memory cache");
        None
    }

    /// Store a decision valid for `ttl`, replacing any previous entry
    pub fn store(&self, key: &str, decision: bool, ttl: Duration) {
        let now = self.clock.now();
        let ttl = Duration::from_secs(ttl_seconds(ttl));
        // Overflow only for absurd TTLs; clamp to a century
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + Duration::from_secs(100 * 365 * 24 * 3600));

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                decision,
                expires_at,
            },
        );
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Purge expired entries every `period` until the cache is dropped
    ///
    /// The task holds only a weak reference, so it never keeps the cache
    /// alive. Must be called from within a tokio runtime.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        let period = period.max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticks.tick().await;

            loop {
                ticks.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let purged = cache.purge_expired();
                if purged > 0 {
                    debug!(purged, remaining = cache.len(), "memory cache swept");
                }
            }
        })
    }

    /// Number of stored entries, expired or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DecisionCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<bool>> {
        Ok(self.lookup(key))
    }

    async fn put(&self, key: &str, decision: bool, ttl: Duration) -> CacheResult<()> {
        self.store(key, decision, ttl);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
