//! Handler for link creation.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, CreateLinkResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a long URL.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// { "long_url": "https://example.com/very/long/path" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "short_url": "/aZ3kP9q" }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if the URL is malformed, too long, or not http/https
/// - 500 Internal Server Error if no unique code could be generated
/// - 503 Service Unavailable if the store is unreachable
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    payload.validate()?;

    let link = state.link_service.create_link(&payload.long_url).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLinkResponse {
            short_url: link.short_path(),
        }),
    ))
}
