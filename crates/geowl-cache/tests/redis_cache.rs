//! Integration tests for the Redis decision cache.
//!
//! These tests require a Redis instance running at `redis://127.0.0.1/`.
//! Tests are ignored by default - run with `cargo test -p geowl-cache --test redis_cache -- --ignored`

use geowl_cache::{DecisionCache, RedisCache, RedisCacheConfig};
use redis::AsyncCommands;
use std::time::Duration;

const REDIS_URL: &str = "redis://127.0.0.1/";

/// Create a cache with a per-test prefix, or `None` if Redis is not reachable
async fn create_test_cache(test_name: &str) -> Option<RedisCache> {
    let config = RedisCacheConfig {
        key_prefix: format!("geowl-test:{test_name}:"),
        connect_timeout: Duration::from_secs(1),
    };

    match RedisCache::connect_with_config(REDIS_URL, config).await {
        Ok(cache) => Some(cache),
        Err(e) => {
            eprintln!("Skipping test: Redis not available at {REDIS_URL}: {e}");
            None
        }
    }
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_redis_put_get() {
    let Some(cache) = create_test_cache("put_get").await else {
        return;
    };

    cache.put("8.8.8.8", true, Duration::from_secs(60)).await.unwrap();
    cache.put("1.1.1.1", false, Duration::from_secs(60)).await.unwrap();

    assert_eq!(cache.get("8.8.8.8").await.unwrap(), Some(true));
    assert_eq!(cache.get("1.1.1.1").await.unwrap(), Some(false));
    assert_eq!(cache.get("9.9.9.9").await.unwrap(), None);
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_redis_entry_expires() {
    let Some(cache) = create_test_cache("expiry").await else {
        return;
    };

    cache.put("2.2.2.2", true, Duration::from_secs(1)).await.unwrap();
    assert_eq!(cache.get("2.2.2.2").await.unwrap(), Some(true));

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(cache.get("2.2.2.2").await.unwrap(), None);
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_redis_unknown_value_is_unset_and_removed() {
    let Some(cache) = create_test_cache("strict").await else {
        return;
    };

    let client = redis::Client::open(REDIS_URL).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let key = "geowl-test:strict:3.3.3.3";
    let _: () = conn.set_ex(key, "true", 60).await.unwrap();

    assert_eq!(cache.get("3.3.3.3").await.unwrap(), None);
    let exists: bool = conn.exists(key).await.unwrap();
    assert!(!exists);
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_redis_instances_share_decisions() {
    let (Some(first), Some(second)) = (
        create_test_cache("shared").await,
        create_test_cache("shared").await,
    ) else {
        return;
    };

    first.put("4.4.4.4", false, Duration::from_secs(60)).await.unwrap();
    assert_eq!(second.get("4.4.4.4").await.unwrap(), Some(false));
}
