//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A live short link and its click tally.
///
/// `code`, `target_url` and `created_at` never change after creation;
/// `click_count` only grows, and only through the store's atomic increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub code: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
    pub click_count: u64,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        code: String,
        target_url: String,
        created_at: DateTime<Utc>,
        click_count: u64,
    ) -> Self {
        Self {
            code,
            target_url,
            created_at,
            click_count,
        }
    }

    /// Path form of the short link, e.g. `/aZ3kP9q`.
    ///
    /// Clients prefix their own origin.
    pub fn short_path(&self) -> String {
        format!("/{}", self.code)
    }
}

/// Input data for inserting a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub code: String,
    pub target_url: String,
}
