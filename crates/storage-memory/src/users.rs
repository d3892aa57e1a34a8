use std::sync::Arc;

use async_trait::async_trait;

use ambitions_core::users::{User, UserCriteria, UserRepositoryTrait};
use ambitions_core::Result;

use crate::store::MemoryStore;

pub struct MemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl MemoryUserRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepositoryTrait for MemoryUserRepository {
    async fn find_many(&self, criteria: UserCriteria) -> Result<Vec<User>> {
        let users = self.store.users.read().await;
        let mut found: Vec<User> = users
            .iter()
            .filter(|u| criteria.matches(u))
            .cloned()
            .collect();
        found.sort_by(|a, b| (&a.lastname, &a.name).cmp(&(&b.lastname, &b.name)));
        Ok(found)
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let users = self.store.users.read().await;
        Ok(users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.store.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}
