#![allow(dead_code)]

use axum::Router;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use shortlink::application::services::LinkService;
use shortlink::config::StoreBackend;
use shortlink::domain::entities::NewLink;
use shortlink::domain::repositories::LinkRepository;
use shortlink::infrastructure::cache::NullCache;
use shortlink::infrastructure::persistence::MemoryLinkRepository;
use shortlink::routes::{RouterOptions, app_router};
use shortlink::state::AppState;
use shortlink::utils::code_generator::RandomCodeGenerator;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;

/// Inserts `ConnectInfo` so the peer-IP rate limiter has an address to key on.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// State over an empty in-memory store, plus a handle to that store.
pub fn create_test_state() -> (AppState, Arc<MemoryLinkRepository>) {
    let store = Arc::new(MemoryLinkRepository::new());
    let state = create_state_with_store(store.clone(), StoreBackend::Memory);
    (state, store)
}

pub fn create_state_with_store(store: Arc<dyn LinkRepository>, backend: StoreBackend) -> AppState {
    let cache = Arc::new(NullCache);
    let link_service = Arc::new(LinkService::new(
        store.clone(),
        Arc::new(RandomCodeGenerator::default()),
        cache.clone(),
    ));

    AppState::new(link_service, store, backend, cache)
}

/// Full application router as served in production, minus path normalization.
pub fn create_test_app(state: AppState) -> Router {
    app_router(state, RouterOptions::default()).layer(MockConnectInfoLayer)
}

pub fn create_test_server() -> (TestServer, Arc<MemoryLinkRepository>) {
    let (state, store) = create_test_state();
    let server = TestServer::new(create_test_app(state)).unwrap();
    (server, store)
}

pub async fn create_test_link(store: &MemoryLinkRepository, code: &str, url: &str) {
    store
        .insert(NewLink {
            code: code.to_string(),
            target_url: url.to_string(),
        })
        .await
        .unwrap();
}

/// Extracts the code from a `short_url` path such as `/aZ3kP9q`.
pub fn code_from_short_url(short_url: &str) -> String {
    short_url.trim_start_matches('/').to_string()
}
