//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target URL and counts the click.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// This is the hot path: a cache lookup (or a single store read) followed by
/// one atomic increment. A failed increment is logged and the redirect is
/// still served.
///
/// # Response
///
/// `307 Temporary Redirect` with `Location` set to the target URL.
///
/// # Errors
///
/// Returns 404 Not Found if the code does not belong to a live link.
/// Returns 503 Service Unavailable if the target cannot be read from the store.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let target_url = state.link_service.resolve_and_count(&code).await?;

    Ok(Redirect::temporary(&target_url))
}
