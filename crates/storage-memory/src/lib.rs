//! In-memory mock storage.
//!
//! Seed fixtures are compiled in and copied into a [`MemoryStore`] at
//! construction. Goals support full CRUD; users are read-only. Mutations live
//! as long as the store does.

mod goals;
mod store;
mod users;

pub use goals::MemoryGoalRepository;
pub use store::MemoryStore;
pub use users::MemoryUserRepository;
