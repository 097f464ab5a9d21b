//! DTOs for the analytics endpoint.

use serde::Serialize;

/// Click count of a single link.
///
/// `clicks` is always a JSON integer; a missing link is a 404 instead.
#[derive(Debug, Serialize)]
pub struct ClicksResponse {
    pub clicks: u64,
}
