//! Ambitions Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic for goal and ambition tracking.
//! It is storage-agnostic and defines the repository traits implemented by
//! the `storage-sqlite`, `storage-memory` and `vendor` crates, plus the
//! factory that picks one of them at startup.

pub mod errors;
pub mod goals;
pub mod sources;
pub mod users;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
