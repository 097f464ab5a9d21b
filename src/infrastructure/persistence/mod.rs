//! Link store implementations.
//!
//! - [`MemoryLinkRepository`] - Sharded in-memory map with atomic click cells
//! - [`PgLinkRepository`] - PostgreSQL table via SQLx
//! - [`GuardedLinkRepository`] - Timeout and circuit-breaker decorator for either

pub mod guarded_link_repository;
pub mod memory_link_repository;
pub mod pg_link_repository;

pub use guarded_link_repository::{CircuitBreaker, GuardSettings, GuardedLinkRepository};
pub use memory_link_repository::MemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;
