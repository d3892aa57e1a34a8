use std::sync::Arc;

use ambitions_core::errors::{Error, Result};
use ambitions_core::goals::Goal;
use ambitions_core::users::{normalize_image_path, User};
use log::debug;
use tokio::sync::RwLock;

const GOALS_FIXTURE: &str = include_str!("../fixtures/goals.json");
const USERS_FIXTURE: &str = include_str!("../fixtures/users.json");

/// Process-local data shared by the mock repositories.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) goals: RwLock<Vec<Goal>>,
    pub(crate) users: RwLock<Vec<User>>,
}

impl MemoryStore {
    /// Profile images are normalized on the way in, as the other stores do
    /// on the way out.
    pub fn new(goals: Vec<Goal>, mut users: Vec<User>) -> Self {
        for user in users.iter_mut() {
            user.image = normalize_image_path(user.image.as_deref());
        }
        Self {
            goals: RwLock::new(goals),
            users: RwLock::new(users),
        }
    }

    /// A fresh store holding its own copy of the bundled fixtures.
    pub fn seeded() -> Result<Arc<Self>> {
        let goals: Vec<Goal> = serde_json::from_str(GOALS_FIXTURE)
            .map_err(|e| Error::Unexpected(format!("Invalid goal fixtures: {}", e)))?;
        let users: Vec<User> = serde_json::from_str(USERS_FIXTURE)
            .map_err(|e| Error::Unexpected(format!("Invalid user fixtures: {}", e)))?;
        debug!(
            "Seeded memory store with {} goals and {} users",
            goals.len(),
            users.len()
        );
        Ok(Arc::new(Self::new(goals, users)))
    }
}
