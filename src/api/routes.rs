//! API route configuration.

use crate::api::handlers::{analytics_handler, create_link_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Link creation routes. Rate limited by the caller.
///
/// - `POST /links` - Create a short link
pub fn link_routes() -> Router<AppState> {
    Router::new().route("/links", post(create_link_handler))
}

/// Read-only analytics routes.
///
/// - `GET /analytics/{code}` - Click count for a link
pub fn analytics_routes() -> Router<AppState> {
    Router::new().route("/analytics/{code}", get(analytics_handler))
}
