//! Link creation, resolution and click accounting.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{CodeGenerator, is_reserved, is_valid_code};
use crate::utils::url_normalizer::normalize_url;
use serde_json::json;
use tracing::{debug, error, info, warn};

/// Default bound on code generation attempts per created link.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Orchestrates the code generator, the link store and the redirect cache.
///
/// This is the only component that knows about both generation and storage.
/// All link mutation goes through the store's atomic operations.
pub struct LinkService {
    store: Arc<dyn LinkRepository>,
    generator: Arc<dyn CodeGenerator>,
    cache: Arc<dyn CacheService>,
    max_attempts: u32,
    dropped_clicks: AtomicU64,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        store: Arc<dyn LinkRepository>,
        generator: Arc<dyn CodeGenerator>,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        Self {
            store,
            generator,
            cache,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            dropped_clicks: AtomicU64::new(0),
        }
    }

    /// Sets the number of generation attempts before giving up.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Creates a short link for `long_url`.
    ///
    /// # Code Generation
    ///
    /// Candidate codes come from the generator; the store's insert-if-absent is
    /// the sole authority on uniqueness. A conflicting or reserved candidate is
    /// discarded and a new one drawn, up to `max_attempts` times.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL is malformed or not http/https
    /// - [`AppError::GenerationExhausted`] if every attempt collided
    /// - [`AppError::StoreUnavailable`] / [`AppError::Internal`] on storage faults
    pub async fn create_link(&self, long_url: &str) -> Result<Link, AppError> {
        let target_url = normalize_url(long_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        for attempt in 1..=self.max_attempts {
            let code = self.generator.generate();

            if is_reserved(&code) {
                debug!(attempt, code = %code, "Generated reserved code, retrying");
                metrics::counter!("shortlink_code_collisions_total").increment(1);
                continue;
            }

            let new_link = NewLink {
                code,
                target_url: target_url.clone(),
            };

            match self.store.insert(new_link).await {
                Ok(link) => {
                    info!(code = %link.code, attempt, "Short link created");
                    metrics::counter!("shortlink_links_created_total").increment(1);
                    return Ok(link);
                }
                Err(AppError::Conflict { .. }) => {
                    debug!(attempt, "Short code collision, retrying");
                    metrics::counter!("shortlink_code_collisions_total").increment(1);
                }
                Err(e) => return Err(e),
            }
        }

        error!(
            attempts = self.max_attempts,
            "Failed to generate a unique short code"
        );

        Err(AppError::generation_exhausted(
            "Failed to generate unique code",
            json!({ "attempts": self.max_attempts }),
        ))
    }

    /// Resolves a code to its target and counts one click.
    ///
    /// # Request Flow
    ///
    /// 1. Check the cache for the target
    /// 2. On a miss, read the store and populate the cache in the background
    /// 3. Increment the click counter exactly once
    /// 4. Return the target
    ///
    /// A failed increment does not fail the resolution: the click is dropped,
    /// logged, and counted in [`Self::dropped_clicks`]. The exception is a
    /// `NotFound` from the store, which means the link is not live even if a
    /// stale cache entry said otherwise.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code does not belong to a live link
    /// - [`AppError::StoreUnavailable`] / [`AppError::Internal`] if the target
    ///   cannot be read
    pub async fn resolve_and_count(&self, code: &str) -> Result<String, AppError> {
        if !is_valid_code(code) {
            return Err(link_not_found(code));
        }

        let cached = if self.cache.is_enabled() {
            self.cache.get_target(code).await.unwrap_or_else(|e| {
                warn!(code, error = %e, "Cache error, falling back to store");
                None
            })
        } else {
            None
        };

        let target_url = match cached {
            Some(target_url) => target_url,
            None => self.load_target(code).await?,
        };

        match self.store.increment_clicks(code).await {
            Ok(clicks) => debug!(code, clicks, "Click recorded"),
            Err(AppError::NotFound { .. }) => return Err(link_not_found(code)),
            Err(e) => self.drop_click(code, &e),
        }

        Ok(target_url)
    }

    /// Returns the current click count of a link. Never mutates state.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code does not belong to a live link
    /// - [`AppError::StoreUnavailable`] / [`AppError::Internal`] on storage faults
    pub async fn get_click_count(&self, code: &str) -> Result<u64, AppError> {
        Ok(self.get_link(code).await?.click_count)
    }

    /// Retrieves a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    pub async fn get_link(&self, code: &str) -> Result<Link, AppError> {
        if !is_valid_code(code) {
            return Err(link_not_found(code));
        }

        self.store
            .find_by_code(code)
            .await?
            .ok_or_else(|| link_not_found(code))
    }

    /// Number of clicks lost to store faults since startup.
    pub fn dropped_clicks(&self) -> u64 {
        self.dropped_clicks.load(Ordering::Relaxed)
    }

    async fn load_target(&self, code: &str) -> Result<String, AppError> {
        let link = self
            .store
            .find_by_code(code)
            .await?
            .ok_or_else(|| link_not_found(code))?;

        if !self.cache.is_enabled() {
            return Ok(link.target_url);
        }

        let cache = self.cache.clone();
        let cache_code = link.code.clone();
        let cache_url = link.target_url.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.set_target(&cache_code, &cache_url, None).await {
                warn!(code = %cache_code, error = %e, "Failed to cache target");
            }
        });

        Ok(link.target_url)
    }

    fn drop_click(&self, code: &str, cause: &AppError) {
        let dropped = self.dropped_clicks.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::counter!("shortlink_clicks_dropped_total").increment(1);
        warn!(
            code,
            error = %cause,
            dropped_total = dropped,
            "Click increment failed, redirect served anyway"
        );
    }
}

fn link_not_found(code: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "code": code }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::{CacheError, MockCacheService, NullCache};
    use crate::utils::code_generator::MockCodeGenerator;
    use chrono::Utc;
    use mockall::Sequence;

    fn test_link(code: &str, url: &str, clicks: u64) -> Link {
        Link::new(code.to_string(), url.to_string(), Utc::now(), clicks)
    }

    fn fixed_generator(code: &'static str) -> MockCodeGenerator {
        let mut generator = MockCodeGenerator::new();
        generator.expect_generate().returning(move || code.to_string());
        generator
    }

    fn service(store: MockLinkRepository, generator: MockCodeGenerator) -> LinkService {
        LinkService::new(Arc::new(store), Arc::new(generator), Arc::new(NullCache))
    }

    #[tokio::test]
    async fn test_create_link_success() {
        let mut store = MockLinkRepository::new();
        store
            .expect_insert()
            .withf(|new_link| {
                new_link.code == "abc1234"
                    && new_link.target_url == "https://example.com/very/long/path"
            })
            .times(1)
            .returning(|new_link| Ok(test_link(&new_link.code, &new_link.target_url, 0)));

        let service = service(store, fixed_generator("abc1234"));

        let link = service
            .create_link("https://example.com/very/long/path")
            .await
            .unwrap();

        assert_eq!(link.code, "abc1234");
        assert_eq!(link.short_path(), "/abc1234");
    }

    #[tokio::test]
    async fn test_create_link_normalizes_url() {
        let mut store = MockLinkRepository::new();
        store
            .expect_insert()
            .withf(|new_link| new_link.target_url == "https://example.com/path#frag")
            .times(1)
            .returning(|new_link| Ok(test_link(&new_link.code, &new_link.target_url, 0)));

        let service = service(store, fixed_generator("abc1234"));

        assert!(
            service
                .create_link("https://EXAMPLE.COM:443/path#frag")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_create_link_invalid_url() {
        let mut store = MockLinkRepository::new();
        store.expect_insert().times(0);
        let mut generator = MockCodeGenerator::new();
        generator.expect_generate().times(0);

        let service = service(store, generator);

        let result = service.create_link("not-a-url").await;
        assert!(matches!(result, Err(AppError::Validation { .. })));

        let result = service.create_link("ftp://example.com/file").await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_link_retries_on_collision() {
        let mut seq = Sequence::new();
        let mut generator = MockCodeGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| "taken01".to_string());
        generator
            .expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| "fresh01".to_string());

        let mut store = MockLinkRepository::new();
        store
            .expect_insert()
            .withf(|new_link| new_link.code == "taken01")
            .times(1)
            .returning(|_| Err(AppError::conflict("taken", json!({}))));
        store
            .expect_insert()
            .withf(|new_link| new_link.code == "fresh01")
            .times(1)
            .returning(|new_link| Ok(test_link(&new_link.code, &new_link.target_url, 0)));

        let service = service(store, generator);

        let link = service.create_link("https://example.com").await.unwrap();
        assert_eq!(link.code, "fresh01");
    }

    #[tokio::test]
    async fn test_create_link_skips_reserved_codes() {
        let mut seq = Sequence::new();
        let mut generator = MockCodeGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| "health".to_string());
        generator
            .expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| "ok12345".to_string());

        let mut store = MockLinkRepository::new();
        store
            .expect_insert()
            .withf(|new_link| new_link.code == "ok12345")
            .times(1)
            .returning(|new_link| Ok(test_link(&new_link.code, &new_link.target_url, 0)));

        let service = service(store, generator);

        let link = service.create_link("https://example.com").await.unwrap();
        assert_eq!(link.code, "ok12345");
    }

    #[tokio::test]
    async fn test_create_link_generation_exhausted() {
        let mut store = MockLinkRepository::new();
        store
            .expect_insert()
            .times(5)
            .returning(|_| Err(AppError::conflict("taken", json!({}))));

        let service = service(store, fixed_generator("same123"));

        let result = service.create_link("https://example.com").await;
        assert!(matches!(result, Err(AppError::GenerationExhausted { .. })));
    }

    #[tokio::test]
    async fn test_create_link_respects_custom_attempt_limit() {
        let mut store = MockLinkRepository::new();
        store
            .expect_insert()
            .times(2)
            .returning(|_| Err(AppError::conflict("taken", json!({}))));

        let service = service(store, fixed_generator("same123")).with_max_attempts(2);

        let result = service.create_link("https://example.com").await;
        assert!(matches!(result, Err(AppError::GenerationExhausted { .. })));
    }

    #[tokio::test]
    async fn test_create_link_store_fault_is_not_retried() {
        let mut store = MockLinkRepository::new();
        store
            .expect_insert()
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("down", json!({}))));

        let service = service(store, fixed_generator("abc1234"));

        let result = service.create_link("https://example.com").await;
        assert!(matches!(result, Err(AppError::StoreUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_resolve_and_count_success() {
        let mut store = MockLinkRepository::new();
        store
            .expect_find_by_code()
            .withf(|code| code == "abc1234")
            .times(1)
            .returning(|code| Ok(Some(test_link(code, "https://example.com/", 0))));
        store
            .expect_increment_clicks()
            .withf(|code| code == "abc1234")
            .times(1)
            .returning(|_| Ok(1));

        let service = service(store, MockCodeGenerator::new());

        let target = service.resolve_and_count("abc1234").await.unwrap();
        assert_eq!(target, "https://example.com/");
        assert_eq!(service.dropped_clicks(), 0);
    }

    #[tokio::test]
    async fn test_resolve_and_count_not_found() {
        let mut store = MockLinkRepository::new();
        store.expect_find_by_code().times(1).returning(|_| Ok(None));
        store.expect_increment_clicks().times(0);

        let service = service(store, MockCodeGenerator::new());

        let result = service.resolve_and_count("missing").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_invalid_code_skips_store() {
        let mut store = MockLinkRepository::new();
        store.expect_find_by_code().times(0);
        store.expect_increment_clicks().times(0);

        let service = service(store, MockCodeGenerator::new());

        let result = service.resolve_and_count("not-a-code!").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_survives_increment_failure() {
        let mut store = MockLinkRepository::new();
        store
            .expect_find_by_code()
            .times(1)
            .returning(|code| Ok(Some(test_link(code, "https://example.com/", 0))));
        store
            .expect_increment_clicks()
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("timeout", json!({}))));

        let service = service(store, MockCodeGenerator::new());

        let target = service.resolve_and_count("abc1234").await.unwrap();
        assert_eq!(target, "https://example.com/");
        assert_eq!(service.dropped_clicks(), 1);
    }

    #[tokio::test]
    async fn test_resolve_uses_cached_target() {
        let mut store = MockLinkRepository::new();
        store.expect_find_by_code().times(0);
        store.expect_increment_clicks().times(1).returning(|_| Ok(7));

        let mut cache = MockCacheService::new();
        cache.expect_is_enabled().return_const(true);
        cache
            .expect_get_target()
            .withf(|code| code == "abc1234")
            .times(1)
            .returning(|_| Ok(Some("https://cached.example.com/".to_string())));

        let service = LinkService::new(
            Arc::new(store),
            Arc::new(MockCodeGenerator::new()),
            Arc::new(cache),
        );

        let target = service.resolve_and_count("abc1234").await.unwrap();
        assert_eq!(target, "https://cached.example.com/");
    }

    #[tokio::test]
    async fn test_resolve_stale_cache_entry_is_not_found() {
        let mut store = MockLinkRepository::new();
        store
            .expect_increment_clicks()
            .times(1)
            .returning(|code| Err(AppError::not_found("missing", json!({ "code": code }))));

        let mut cache = MockCacheService::new();
        cache.expect_is_enabled().return_const(true);
        cache
            .expect_get_target()
            .returning(|_| Ok(Some("https://gone.example.com/".to_string())));

        let service = LinkService::new(
            Arc::new(store),
            Arc::new(MockCodeGenerator::new()),
            Arc::new(cache),
        );

        let result = service.resolve_and_count("abc1234").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
        assert_eq!(service.dropped_clicks(), 0);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_store_on_cache_error() {
        let mut store = MockLinkRepository::new();
        store
            .expect_find_by_code()
            .times(1)
            .returning(|code| Ok(Some(test_link(code, "https://example.com/", 0))));
        store.expect_increment_clicks().times(1).returning(|_| Ok(1));

        let mut cache = MockCacheService::new();
        cache.expect_is_enabled().return_const(true);
        cache
            .expect_get_target()
            .times(1)
            .returning(|_| Err(CacheError::OperationError("boom".to_string())));
        cache.expect_set_target().returning(|_, _, _| Ok(()));

        let service = LinkService::new(
            Arc::new(store),
            Arc::new(MockCodeGenerator::new()),
            Arc::new(cache),
        );

        let target = service.resolve_and_count("abc1234").await.unwrap();
        assert_eq!(target, "https://example.com/");
    }

    #[tokio::test]
    async fn test_resolve_skips_disabled_cache() {
        let mut store = MockLinkRepository::new();
        store
            .expect_find_by_code()
            .times(1)
            .returning(|code| Ok(Some(test_link(code, "https://example.com/", 0))));
        store.expect_increment_clicks().times(1).returning(|_| Ok(1));

        let mut cache = MockCacheService::new();
        cache.expect_is_enabled().return_const(false);
        cache.expect_get_target().times(0);
        cache.expect_set_target().times(0);

        let service = LinkService::new(
            Arc::new(store),
            Arc::new(MockCodeGenerator::new()),
            Arc::new(cache),
        );

        let target = service.resolve_and_count("abc1234").await.unwrap();
        assert_eq!(target, "https://example.com/");
    }

    #[tokio::test]
    async fn test_get_click_count_never_increments() {
        let mut store = MockLinkRepository::new();
        store
            .expect_find_by_code()
            .times(3)
            .returning(|code| Ok(Some(test_link(code, "https://example.com/", 42))));
        store.expect_increment_clicks().times(0);

        let service = service(store, MockCodeGenerator::new());

        for _ in 0..3 {
            assert_eq!(service.get_click_count("abc1234").await.unwrap(), 42);
        }
    }

    #[tokio::test]
    async fn test_get_click_count_not_found() {
        let mut store = MockLinkRepository::new();
        store.expect_find_by_code().times(1).returning(|_| Ok(None));

        let service = service(store, MockCodeGenerator::new());

        let result = service.get_click_count("doesnotexist").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }
}
