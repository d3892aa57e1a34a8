//! SQLite storage implementation for Ambitions.
//!
//! This crate provides the database-backed repositories using Diesel ORM with
//! SQLite. It implements the repository traits defined in `ambitions-core` and
//! contains:
//! - Database connection pooling and the single-writer actor
//! - Embedded Diesel migrations
//! - Repository implementations for goals and users
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! ```text
//!        core (domain + traits)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod goals;
pub mod users;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from ambitions-core for convenience
pub use ambitions_core::errors::{DatabaseError, Error, Result};
