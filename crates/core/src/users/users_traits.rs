use crate::errors::Result;
use crate::users::users_model::{User, UserCriteria};
use async_trait::async_trait;

/// Trait for user repository operations. Users are read-only through it.
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn find_many(&self, criteria: UserCriteria) -> Result<Vec<User>>;
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>>;
    /// Emails match ignoring ASCII case.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Trait for user service operations
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn get_user(&self, email: &str) -> Result<Option<User>>;
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>>;
}
