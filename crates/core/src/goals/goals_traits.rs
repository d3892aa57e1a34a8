use crate::errors::Result;
use crate::goals::goals_model::{
    Goal, GoalCriteria, GoalFilters, GoalUpdate, ManagerAmbitionsData, NewGoal,
};
use async_trait::async_trait;

/// Trait for goal repository operations.
///
/// Implemented by the SQLite, vendor and in-memory stores. A missing goal is
/// `Ok(None)` (or `Ok(0)` for deletes), never an error.
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    async fn find_many(&self, criteria: GoalCriteria) -> Result<Vec<Goal>>;
    async fn find_by_id(&self, goal_id: &str) -> Result<Option<Goal>>;
    async fn create(&self, new_goal: NewGoal) -> Result<Goal>;
    async fn update(&self, goal_id: &str, goal_update: GoalUpdate) -> Result<Option<Goal>>;
    async fn delete(&self, goal_id: &str) -> Result<usize>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    async fn get_goals(&self, owner_email: Option<&str>) -> Result<Vec<Goal>>;
    async fn get_goal(&self, goal_id: &str) -> Result<Option<Goal>>;
    async fn create_goal(&self, acting_email: &str, new_goal: NewGoal) -> Result<Goal>;
    async fn update_goal(
        &self,
        acting_email: &str,
        goal_id: &str,
        goal_update: GoalUpdate,
    ) -> Result<Option<Goal>>;
    async fn delete_goal(&self, goal_id: &str) -> Result<usize>;
    async fn get_goal_filters(&self, owner_email: Option<&str>) -> Result<GoalFilters>;
    async fn get_manager_ambitions(&self, email: &str) -> Result<ManagerAmbitionsData>;
    async fn get_ambitions(&self) -> Result<Vec<Goal>>;
}
