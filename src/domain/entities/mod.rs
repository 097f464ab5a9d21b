//! Core domain entities.
//!
//! - [`Link`] - A live short code with its target and click count
//! - [`NewLink`] - Input for inserting a link into the store

pub mod link;

pub use link::{Link, NewLink};
