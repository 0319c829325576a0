//! Building a [`Gatekeeper`] from configuration files.

use crate::config::{EngineConfig, RedisConfig};
use crate::pipeline::Gatekeeper;
use geowl_cache::{DecisionCache, MemoryCache, RedisCache, RedisCacheConfig};
use geowl_client::GeoClient;
use geowl_core::{Result, WhitelistConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Pick the decision cache backend
///
/// Redis when enabled and reachable; otherwise the in-process cache, swept
/// of expired entries once per `ttl`. An unreachable Redis is logged, never
/// fatal.
pub async fn build_cache(redis: &RedisConfig, ttl: Duration) -> Arc<dyn DecisionCache> {
    if !redis.enabled {
        info!("using in-process decision cache");
        return swept_memory_cache(ttl);
    }

    let config = RedisCacheConfig {
        key_prefix: redis.key_prefix.clone(),
        ..RedisCacheConfig::default()
    };

    match RedisCache::connect_with_config(&redis.url(), config).await {
        Ok(cache) => {
            info!(host = %redis.host, port = redis.port, db = redis.db, "using Redis decision cache");
            Arc::new(cache)
        }
        Err(e) => {
            error!(
                host = %redis.host,
                port = redis.port,
                error = %e,
                "Redis unreachable, falling back to in-process decision cache"
            );
            swept_memory_cache(ttl)
        }
    }
}

fn swept_memory_cache(ttl: Duration) -> Arc<dyn DecisionCache> {
    let cache = Arc::new(MemoryCache::new());
    // Detached; the sweeper exits once the cache is dropped
    drop(cache.spawn_sweeper(ttl));
    cache
}

/// Build the geo service client described by `config`
pub fn build_resolver(config: &EngineConfig) -> Result<GeoClient> {
    let mut builder = GeoClient::builder()
        .base_url(&config.service_url)
        .timeout(config.lookup_timeout());

    if let Some(limit) = config.rate_limit {
        builder = builder.rate_limit(limit.into());
    }

    builder.build()
}

impl Gatekeeper {
    /// Build a gatekeeper from engine and whitelist configuration
    ///
    /// Fails if the whitelist has no usable entry or the service URL is
    /// invalid.
    pub async fn from_config(engine: &EngineConfig, whitelist: &WhitelistConfig) -> Result<Self> {
        let policy = whitelist.build_policy()?;
        let resolver = build_resolver(engine)?;
        let cache = build_cache(&engine.redis, engine.cache_ttl()).await;

        info!(
            service = resolver.base_url(),
            ttl_secs = engine.cache_expiry,
            addresses = policy.whitelist.address_count(),
            ranges = policy.whitelist.ranges().len(),
            countries = policy.geo.countries().count(),
            "gatekeeper ready"
        );

        Ok(Self::builder(policy, Arc::new(resolver))
            .cache(cache)
            .ttl(engine.cache_ttl())
            .lookup_timeout(engine.lookup_timeout())
            .build())
    }

    /// Recompile `whitelist` and swap it in
    ///
    /// On error the current policy stays in place.
    pub fn reload(&self, whitelist: &WhitelistConfig) -> Result<()> {
        let policy = whitelist.build_policy()?;
        self.replace_policy(policy);
        Ok(())
    }
}
