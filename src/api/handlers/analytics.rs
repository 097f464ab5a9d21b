//! Handler for per-link click analytics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::analytics::ClicksResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the click count of a short link.
///
/// # Endpoint
///
/// `GET /api/analytics/{code}`
///
/// Reading analytics never counts as a click.
///
/// # Response
///
/// ```json
/// { "clicks": 42 }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the code does not belong to a live link.
pub async fn analytics_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ClicksResponse>, AppError> {
    let clicks = state.link_service.get_click_count(&code).await?;

    Ok(Json(ClicksResponse { clicks }))
}
