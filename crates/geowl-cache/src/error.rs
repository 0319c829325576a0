use geowl_core::GeoWlError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for cache operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors from a decision cache backend
#[derive(Error, Debug)]
pub enum CacheError {
    /// Redis command or connection failed
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Backend did not answer in time
    #[error("cache backend timed out after {0:?}")]
    Timeout(Duration),
}

impl From<CacheError> for GeoWlError {
    fn from(err: CacheError) -> Self {
        Self::CacheUnavailable(err.to_string())
    }
}
