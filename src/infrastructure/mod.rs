//! Infrastructure layer for external integrations.
//!
//! Implements interfaces defined by the domain layer:
//!
//! - [`cache`] - Redirect target cache (Redis and no-op implementations)
//! - [`persistence`] - Link store backends

pub mod cache;
pub mod persistence;
