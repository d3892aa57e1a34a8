use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::users_model::User;
use super::users_traits::{UserRepositoryTrait, UserServiceTrait};
use crate::errors::Result;

/// Pass-through lookups over the configured user repository. No caching.
pub struct UserService {
    repository: Arc<dyn UserRepositoryTrait>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl UserServiceTrait for UserService {
    async fn get_user(&self, email: &str) -> Result<Option<User>> {
        debug!("Looking up user by email {}", email);
        self.repository.get_by_email(email.trim()).await
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>> {
        self.repository.find_by_id(user_id).await
    }
}
