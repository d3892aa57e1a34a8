//! SQLite storage implementation for goals.

mod model;
mod repository;

pub use model::{AssigneeDB, GoalDB};
pub use repository::GoalRepository;
