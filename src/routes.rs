//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`               - Short link redirect
//! - `GET  /health`               - Health check: store, cache, dropped clicks
//! - `POST /api/links`            - Create a short link (rate limited)
//! - `GET  /api/analytics/{code}` - Click count for a link
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on link creation
//!
//! Trailing-slash normalization wraps the whole router and is applied in
//! [`crate::server::run`], since it must run before routing.

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::rate_limit::{self, RateLimitSettings};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;

/// Options that shape the router but are not part of handler state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouterOptions {
    /// When `true`, rate limiting reads client IP from `X-Forwarded-For` /
    /// `X-Real-IP` headers instead of the peer socket address.
    pub behind_proxy: bool,
    pub rate_limit: RateLimitSettings,
}

/// Constructs the application router with all routes and middleware.
///
/// The rate limiter needs the peer address, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn app_router(state: AppState, options: RouterOptions) -> Router {
    let link_routes = api::routes::link_routes();
    let link_routes = if options.behind_proxy {
        match rate_limit::proxied_layer(options.rate_limit) {
            Some(layer) => link_routes.layer(layer),
            None => unlimited(link_routes),
        }
    } else {
        match rate_limit::layer(options.rate_limit) {
            Some(layer) => link_routes.layer(layer),
            None => unlimited(link_routes),
        }
    };

    let api_router = Router::new()
        .merge(link_routes)
        .merge(api::routes::analytics_routes());

    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer())
}

fn unlimited(routes: Router<AppState>) -> Router<AppState> {
    ::tracing::warn!("Rate limit settings rejected, link creation is not rate limited");
    routes
}
