//! Redis-backed decision cache.
//!
//! Decisions survive process restarts and are shared by every instance
//! pointed at the same Redis database. Expiry is delegated to Redis via
//! `SETEX`, so an expired key is simply absent.
//!
//! ## Value encoding
//!
//! A decision is stored as the literal `True` or `False`. Anything else
//! found under a key is treated as unset and deleted on read, so a value
//! written by an incompatible version can never be mistaken for a decision.
//! The delete is a compare-and-delete script: a valid decision written by a
//! sibling between the read and the delete is left alone.

use crate::{CacheError, CacheResult, DecisionCache};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

const ALLOW_VALUE: &str = "True";
const DENY_VALUE: &str = "False";

/// Deletes `KEYS[1]` only if it still holds `ARGV[1]`
const DELETE_IF_UNCHANGED: &str = r"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
";

/// Encode a decision for storage
#[must_use]
pub const fn encode_decision(decision: bool) -> &'static str {
    if decision {
        ALLOW_VALUE
    } else {
        DENY_VALUE
    }
}

/// Decode a stored value; `None` for anything but the two known literals
#[must_use]
pub fn decode_decision(value: &[u8]) -> Option<bool> {
    match value {
        v if v == ALLOW_VALUE.as_bytes() => Some(true),
        v if v == DENY_VALUE.as_bytes() => Some(false),
        _ => None,
    }
}

/// Whole seconds a decision stays cached, rounded up and never zero
///
/// Both backends expire on this value, so a sub-second TTL lives exactly as
/// long in memory as it does under `SETEX`.
#[must_use]
pub fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl
        .as_secs()
        .saturating_add(u64::from(ttl.subsec_nanos() > 0));
    secs.max(1)
}

/// Configuration for Redis storage.
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Prepended to every key (default: empty, keys are bare addresses)
    pub key_prefix: String,
    /// Bound on establishing the connection (default: 3 seconds)
    pub connect_timeout: Duration,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: String::new(),
            connect_timeout: Duration::from_secs(3),
        }
    }
}

/// Redis-backed [`DecisionCache`]
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connect to Redis with default configuration.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., "redis://127.0.0.1/")
    pub async fn connect(url: &str) -> CacheResult<Self> {
        Self::connect_with_config(url, RedisCacheConfig::default()).await
    }

    /// Connect to Redis and verify it answers `PING`.
    pub async fn connect_with_config(url: &str, config: RedisCacheConfig) -> CacheResult<Self> {
        let client = Client::open(url)?;
        let connect = async {
            let mut connection = ConnectionManager::new(client).await?;
            let _: String = redis::cmd("PING").query_async(&mut connection).await?;
            Ok::<_, CacheError>(connection)
        };

        let connection = tokio::time::timeout(config.connect_timeout, connect)
            .await
            .map_err(|_| CacheError::Timeout(config.connect_timeout))??;

        debug!(url = %url, prefix = %config.key_prefix, "connected to Redis");
        Ok(Self { connection, config })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.config.key_prefix, key)
    }

    /// Delete `key` if it still holds `seen`; returns true if it was deleted
    async fn delete_if_unchanged(&self, key: &str, seen: &[u8]) -> CacheResult<bool> {
        let mut conn = self.connection.clone();
        let deleted: i64 = Script::new(DELETE_IF_UNCHANGED)
            .key(key)
            .arg(seen)
            .invoke_async(&mut conn)
            .await?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl DecisionCache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<bool>> {
        let key = self.key(key);
        let mut conn = self.connection.clone();

        let value: Option<Vec<u8>> = conn.get(&key).await?;
        let Some(value) = value else {
            return Ok(None);
        };

        if let Some(decision) = decode_decision(&value) {
            return Ok(Some(decision));
        }

        warn!(key = %key, "unrecognised value in Redis cache, deleting");
        if !self.delete_if_unchanged(&key, &value).await? {
            debug!(key = %key, "value replaced before delete, keeping it");
        }
        Ok(None)
    }

    async fn put(&self, key: &str, decision: bool, ttl: Duration) -> CacheResult<()> {
        let key = self.key(key);
        let mut conn = self.connection.clone();

        conn.set_ex::<_, _, ()>(&key, encode_decision(decision), ttl_seconds(ttl))
            .await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
