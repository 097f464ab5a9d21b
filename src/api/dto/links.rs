//! DTOs for the link creation endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Longest target URL accepted, in characters.
pub const MAX_URL_LENGTH: usize = 2048;
const MAX_URL_LENGTH_U64: u64 = MAX_URL_LENGTH as u64;

/// Request body for `POST /api/links`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// The original URL to shorten. Scheme and syntax are checked by the service.
    #[validate(length(min = 1, max = MAX_URL_LENGTH_U64, message = "URL must be 1-2048 characters"))]
    pub long_url: String,
}

/// Response body for a created link.
///
/// `short_url` is a path (`/<code>`); clients prefix their own origin.
#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub short_url: String,
}
