//! No-op cache implementation for testing or disabled caching.

use super::service::{CacheResult, CacheService, LinkSnapshot};
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Used when `REDIS_URL` is not set or the Redis connection fails at startup.
/// Every lookup is a miss, so all reads go to the repository.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_link(&self, _code: &str) -> CacheResult<Option<LinkSnapshot>> {
        Ok(None)
    }

    async fn set_link(
        &self,
        _code: &str,
        _snapshot: &LinkSnapshot,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
