//! Repository trait for short link storage and click accounting.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable, unique-keyed storage mapping `code -> Link`.
///
/// This is the only place where link state is mutated. All operations are scoped
/// to a single code, so implementations should use per-key atomic primitives
/// rather than a lock over the whole keyspace.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - process-local map
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL table
/// - [`crate::infrastructure::persistence::GuardedLinkRepository`] - timeout and
///   circuit-breaker decorator over either of the above
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a link if its code is not already taken.
    ///
    /// The existence check and the write are one atomic step: of two concurrent
    /// inserts for the same code, at most one succeeds. A failed insert leaves
    /// nothing behind.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code already exists.
    /// Returns [`AppError::StoreUnavailable`] or [`AppError::Internal`] on storage faults.
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    ///
    /// Never observes a partially written link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] or [`AppError::Internal`] on storage faults.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Atomically adds one click and returns the new count.
    ///
    /// Concurrent increments on the same code are never lost.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code does not exist.
    /// Returns [`AppError::StoreUnavailable`] or [`AppError::Internal`] on storage faults.
    async fn increment_clicks(&self, code: &str) -> Result<u64, AppError>;

    /// Checks that the backing store answers.
    async fn health_check(&self) -> bool;
}
