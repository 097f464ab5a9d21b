//! Shared application state for HTTP handlers.

use std::sync::Arc;

use crate::application::services::LinkService;
use crate::config::StoreBackend;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;

/// State injected into every handler via Axum's `State` extractor.
///
/// All fields are cheap to clone (`Arc` or `Copy`).
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    /// The store the service writes to, exposed for health reporting.
    pub store: Arc<dyn LinkRepository>,
    pub store_backend: StoreBackend,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService>,
        store: Arc<dyn LinkRepository>,
        store_backend: StoreBackend,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        Self {
            link_service,
            store,
            store_backend,
            cache,
        }
    }
}
