//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Read-through cache of `code -> target_url` for the redirect path.
///
/// Targets never change after creation, so entries cannot go stale; they only
/// expire to bound memory. Cache failures must degrade to store lookups and must
/// never fail a redirect.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached target for a code, or `None` on a miss.
    async fn get_target(&self, code: &str) -> CacheResult<Option<String>>;

    /// Caches a target, using the implementation's default TTL when `ttl_seconds` is `None`.
    async fn set_target(
        &self,
        code: &str,
        target_url: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name for health reports.
    fn backend(&self) -> &'static str;

    /// False when lookups can never hit, letting callers skip the round trip.
    fn is_enabled(&self) -> bool;
}
