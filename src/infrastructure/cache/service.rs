//! Cache service trait and error types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entities::{Link, LinkTarget};

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Everything the redirect path needs about a link, stored as one cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSnapshot {
    pub link: Link,
    pub targets: Vec<LinkTarget>,
}

/// Trait for caching link snapshots keyed by the code used in the request.
///
/// Implementations must be thread-safe and handle errors gracefully without
/// disrupting the application (cache failures degrade to repository lookups).
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the snapshot stored under `code`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(snapshot))` on cache hit
    /// - `Ok(None)` on cache miss, undecodable entry or backend error (fail-open)
    async fn get_link(&self, code: &str) -> CacheResult<Option<LinkSnapshot>>;

    /// Stores a snapshot under `code`.
    ///
    /// `ttl_seconds = None` uses the implementation's default TTL.
    async fn set_link(
        &self,
        code: &str,
        snapshot: &LinkSnapshot,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Removes the entry for `code`, if any.
    async fn invalidate(&self, code: &str) -> CacheResult<()>;

    /// Returns `true` if the backend is reachable.
    async fn health_check(&self) -> bool;
}
