use async_trait::async_trait;
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::goals_model::{
    FilterOption, Goal, GoalCriteria, GoalFilters, GoalStatus, GoalUpdate, ManagerAmbition,
    ManagerAmbitionsData, NewGoal,
};
use super::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
use crate::errors::{Error, Result, ValidationError};
use crate::users::{User, UserServiceTrait};

/// Service orchestrating the goal repository and the user lookup.
pub struct GoalService {
    repository: Arc<dyn GoalRepositoryTrait>,
    user_service: Arc<dyn UserServiceTrait>,
}

impl GoalService {
    pub fn new(
        repository: Arc<dyn GoalRepositoryTrait>,
        user_service: Arc<dyn UserServiceTrait>,
    ) -> Self {
        Self {
            repository,
            user_service,
        }
    }

    async fn resolve_acting_user(&self, acting_email: &str) -> Result<User> {
        self.user_service
            .get_user(acting_email)
            .await?
            .ok_or_else(|| Error::ActingUserNotFound(acting_email.to_string()))
    }

    async fn require_parent(&self, parent_id: &str) -> Result<Goal> {
        self.repository
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| ValidationError::UnknownParent(parent_id.to_string()).into())
    }

    /// Walks up from `parent_id` and fails if `goal_id` shows up in the chain.
    async fn ensure_no_cycle(&self, goal_id: &str, parent_id: &str) -> Result<()> {
        let cycle = || {
            Error::from(ValidationError::ParentCycle {
                goal_id: goal_id.to_string(),
                parent_id: parent_id.to_string(),
            })
        };

        let mut visited = HashSet::new();
        let mut current = Some(self.require_parent(parent_id).await?);
        while let Some(goal) = current {
            if goal.id == goal_id
                || goal.ancestor_ids().contains(&goal_id)
                || !visited.insert(goal.id.clone())
            {
                return Err(cycle());
            }
            current = match goal.parent_id.as_deref() {
                Some(next) => self.repository.find_by_id(next).await?,
                None => None,
            };
        }
        Ok(())
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Groups goals into filter options, sorted by label.
pub fn build_goal_filters(goals: &[Goal]) -> GoalFilters {
    fn collect(entries: impl Iterator<Item = (String, String)>) -> Vec<FilterOption> {
        let mut grouped: BTreeMap<String, FilterOption> = BTreeMap::new();
        for (value, label) in entries {
            grouped
                .entry(value.clone())
                .or_insert_with(|| FilterOption {
                    value,
                    label,
                    count: 0,
                })
                .count += 1;
        }
        let mut options: Vec<FilterOption> = grouped.into_values().collect();
        options.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.value.cmp(&b.value)));
        options
    }

    GoalFilters {
        statuses: collect(
            goals
                .iter()
                .map(|g| (g.status.as_str().to_string(), g.status.label().to_string())),
        ),
        types: collect(
            goals
                .iter()
                .map(|g| (g.goal_type.clone(), g.goal_type.clone())),
        ),
        owners: collect(goals.iter().filter_map(|g| {
            g.assigned_to.clone().map(|owner| {
                let label = g.user_name.clone().unwrap_or_else(|| owner.clone());
                (owner, label)
            })
        })),
        periods: collect(
            goals
                .iter()
                .filter_map(|g| g.period_id.clone().map(|p| (p.clone(), p))),
        ),
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    async fn get_goals(&self, owner_email: Option<&str>) -> Result<Vec<Goal>> {
        let criteria = match owner_email {
            Some(email) => match self.user_service.get_user(email).await? {
                Some(owner) => GoalCriteria::assigned_to(owner.id),
                None => {
                    debug!("No user for {}, returning no goals", email);
                    return Ok(Vec::new());
                }
            },
            None => GoalCriteria::default(),
        };
        self.repository.find_many(criteria).await
    }

    async fn get_goal(&self, goal_id: &str) -> Result<Option<Goal>> {
        self.repository.find_by_id(goal_id).await
    }

    async fn create_goal(&self, acting_email: &str, new_goal: NewGoal) -> Result<Goal> {
        let acting_user = self.resolve_acting_user(acting_email).await?;
        new_goal.validate()?;

        let parent_id = blank_to_none(new_goal.parent_id);
        if let Some(parent) = parent_id.as_deref() {
            self.require_parent(parent).await?;
        }

        let payload = NewGoal {
            assigned_to: blank_to_none(new_goal.assigned_to).or(Some(acting_user.id.clone())),
            created_by: Some(acting_user.id),
            parent_id,
            ..new_goal
        };
        debug!(
            "Creating goal '{}' for {:?}",
            payload.title, payload.assigned_to
        );
        self.repository.create(payload).await
    }

    async fn update_goal(
        &self,
        acting_email: &str,
        goal_id: &str,
        goal_update: GoalUpdate,
    ) -> Result<Option<Goal>> {
        self.resolve_acting_user(acting_email).await?;
        goal_update.validate()?;

        let goal_update = GoalUpdate {
            parent_id: blank_to_none(goal_update.parent_id),
            assigned_to: blank_to_none(goal_update.assigned_to),
            ..goal_update
        };
        if let Some(parent) = goal_update.parent_id.as_deref() {
            self.ensure_no_cycle(goal_id, parent).await?;
        }
        self.repository.update(goal_id, goal_update).await
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<usize> {
        let removed = self.repository.delete(goal_id).await?;
        if removed == 0 {
            warn!("Delete requested for unknown goal {}", goal_id);
        }
        Ok(removed)
    }

    async fn get_goal_filters(&self, owner_email: Option<&str>) -> Result<GoalFilters> {
        let goals = self.get_goals(owner_email).await?;
        Ok(build_goal_filters(&goals))
    }

    async fn get_manager_ambitions(&self, email: &str) -> Result<ManagerAmbitionsData> {
        let Some(user) = self.user_service.get_user(email).await? else {
            return Ok(ManagerAmbitionsData::default());
        };
        let Some(manager_id) = user.manager_id.as_deref() else {
            return Ok(ManagerAmbitionsData::default());
        };
        let Some(manager) = self.user_service.get_user_by_id(manager_id).await? else {
            warn!("Manager {} of {} not found", manager_id, email);
            return Ok(ManagerAmbitionsData::default());
        };

        let goals = self
            .repository
            .find_many(GoalCriteria {
                assigned_to: Some(manager.id.clone()),
                top_level_only: true,
                ..Default::default()
            })
            .await?;

        // Every store returns goals with their direct children attached.
        let ambitions = goals
            .into_iter()
            .filter(|g| g.status != GoalStatus::Archived)
            .map(|goal| ManagerAmbition {
                laddered_count: goal.laddered_goals.len(),
                goal,
            })
            .collect();

        Ok(ManagerAmbitionsData {
            manager: Some(manager),
            ambitions,
        })
    }

    async fn get_ambitions(&self) -> Result<Vec<Goal>> {
        self.repository.find_many(GoalCriteria::top_level()).await
    }
}
