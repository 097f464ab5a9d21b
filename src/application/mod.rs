//! Application layer services implementing business logic.
//!
//! Services orchestrate domain operations by coordinating repository calls,
//! validation, and business rules, and provide a clean API for HTTP handlers.
//!
//! - [`services::link_service::LinkService`] - Link creation, redirect resolution
//!   and click accounting

pub mod services;
