//! Domain layer containing business entities and storage contracts.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.
//! Implementations of the repository traits live in [`crate::infrastructure`].

pub mod entities;
pub mod repositories;
