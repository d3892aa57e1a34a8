use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use uuid::Uuid;

use ambitions_core::errors::ValidationError;
use ambitions_core::goals::{
    rebase_path, Goal, GoalCriteria, GoalRepositoryTrait, GoalUpdate, NewGoal,
};
use ambitions_core::users::User;
use ambitions_core::Result;

use crate::store::MemoryStore;

/// Goal repository over the shared [`MemoryStore`].
pub struct MemoryGoalRepository {
    store: Arc<MemoryStore>,
}

impl MemoryGoalRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

fn sort_goals(goals: &mut [Goal]) {
    goals.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
}

fn with_assignee(mut goal: Goal, users: &[User]) -> Goal {
    let assignee = goal
        .assigned_to
        .as_deref()
        .and_then(|id| users.iter().find(|u| u.id == id));
    goal.user_name = assignee.map(User::full_name);
    goal.user_image = assignee.and_then(|u| u.image.clone());
    goal.laddered_goals = Vec::new();
    goal
}

/// Stored goal plus assignee columns and its direct children.
fn enrich(goal: &Goal, all: &[Goal], users: &[User]) -> Goal {
    let mut children: Vec<Goal> = all
        .iter()
        .filter(|g| g.parent_id.as_deref() == Some(goal.id.as_str()))
        .map(|g| with_assignee(g.clone(), users))
        .collect();
    sort_goals(&mut children);

    let mut enriched = with_assignee(goal.clone(), users);
    enriched.laddered_goals = children;
    enriched
}

fn path_under(goals: &[Goal], parent_id: &str) -> Result<String> {
    goals
        .iter()
        .find(|g| g.id == parent_id)
        .map(Goal::child_path)
        .ok_or_else(|| ValidationError::UnknownParent(parent_id.to_string()).into())
}

fn rebase_descendants(goals: &mut [Goal], old_prefix: &str, new_prefix: Option<&str>) -> usize {
    let mut rewritten = 0;
    for goal in goals.iter_mut() {
        let Some(new_path) = goal
            .path
            .as_deref()
            .and_then(|p| rebase_path(p, old_prefix, new_prefix))
        else {
            continue;
        };
        goal.path = new_path;
        rewritten += 1;
    }
    rewritten
}

#[async_trait]
impl GoalRepositoryTrait for MemoryGoalRepository {
    async fn find_many(&self, criteria: GoalCriteria) -> Result<Vec<Goal>> {
        let goals = self.store.goals.read().await;
        let users = self.store.users.read().await;

        let mut found: Vec<Goal> = goals
            .iter()
            .filter(|g| criteria.matches(g))
            .map(|g| enrich(g, &goals, &users))
            .collect();
        sort_goals(&mut found);
        Ok(found)
    }

    async fn find_by_id(&self, goal_id: &str) -> Result<Option<Goal>> {
        let goals = self.store.goals.read().await;
        let users = self.store.users.read().await;
        Ok(goals
            .iter()
            .find(|g| g.id == goal_id)
            .map(|g| enrich(g, &goals, &users)))
    }

    async fn create(&self, new_goal: NewGoal) -> Result<Goal> {
        let mut goals = self.store.goals.write().await;
        let path = match new_goal.parent_id.as_deref() {
            Some(parent_id) => Some(path_under(&goals, parent_id)?),
            None => None,
        };

        let now = Utc::now();
        let goal = Goal {
            id: Uuid::new_v4().to_string(),
            title: new_goal.title,
            description: new_goal.description,
            goal_type: new_goal.goal_type,
            status: new_goal.status,
            parent_id: new_goal.parent_id,
            path,
            assigned_to: new_goal.assigned_to,
            created_by: new_goal.created_by,
            period_id: new_goal.period_id,
            created_at: now,
            updated_at: now,
            user_name: None,
            user_image: None,
            laddered_goals: Vec::new(),
        };
        debug!("Created in-memory goal {}", goal.id);
        goals.push(goal.clone());

        let users = self.store.users.read().await;
        Ok(enrich(&goal, &goals, &users))
    }

    async fn update(&self, goal_id: &str, goal_update: GoalUpdate) -> Result<Option<Goal>> {
        let mut goals = self.store.goals.write().await;
        let Some(index) = goals.iter().position(|g| g.id == goal_id) else {
            return Ok(None);
        };

        let mut goal = goals[index].clone();
        let old_prefix = goal.child_path();
        let old_parent = goal.parent_id.clone();

        goal_update.apply_to(&mut goal);
        let reparented = goal.parent_id != old_parent;
        if let (true, Some(parent_id)) = (reparented, goal.parent_id.as_deref()) {
            goal.path = Some(path_under(&goals, parent_id)?);
        }
        let new_prefix = goal.child_path();
        goals[index] = goal;

        if reparented {
            let moved = rebase_descendants(&mut goals, &old_prefix, Some(&new_prefix));
            debug!("Re-laddered goal {} with {} descendants", goal_id, moved);
        }

        let users = self.store.users.read().await;
        Ok(Some(enrich(&goals[index], &goals, &users)))
    }

    async fn delete(&self, goal_id: &str) -> Result<usize> {
        let mut goals = self.store.goals.write().await;
        let Some(index) = goals.iter().position(|g| g.id == goal_id) else {
            return Ok(0);
        };

        let prefix = goals[index].child_path();
        goals.remove(index);
        for child in goals
            .iter_mut()
            .filter(|g| g.parent_id.as_deref() == Some(goal_id))
        {
            child.parent_id = None;
        }
        rebase_descendants(&mut goals, &prefix, None);
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambitions_core::errors::Error;
    use ambitions_core::goals::GoalStatus;

    fn repository() -> MemoryGoalRepository {
        MemoryGoalRepository::new(MemoryStore::seeded().unwrap())
    }

    #[tokio::test]
    async fn create_then_find_returns_every_supplied_field() {
        let repo = repository();
        let created = repo
            .create(NewGoal {
                title: "Mentor two engineers".to_string(),
                description: Some("Pair weekly".to_string()),
                goal_type: "development".to_string(),
                status: GoalStatus::AwaitingApproval,
                parent_id: Some("g-platform".to_string()),
                period_id: Some("2026-H1".to_string()),
                assigned_to: Some("u-alan".to_string()),
                created_by: Some("u-grace".to_string()),
            })
            .await
            .unwrap();

        let found = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert!(!found.id.is_empty());
        assert_eq!(found.title, "Mentor two engineers");
        assert_eq!(found.description.as_deref(), Some("Pair weekly"));
        assert_eq!(found.goal_type, "development");
        assert_eq!(found.status, GoalStatus::AwaitingApproval);
        assert_eq!(found.parent_id.as_deref(), Some("g-platform"));
        assert_eq!(found.path.as_deref(), Some("g-platform"));
        assert_eq!(found.period_id.as_deref(), Some("2026-H1"));
        assert_eq!(found.assigned_to.as_deref(), Some("u-alan"));
        assert_eq!(found.created_by.as_deref(), Some("u-grace"));
        assert_eq!(found.user_name.as_deref(), Some("Alan Turing"));
        assert_eq!(found.created_at, found.updated_at);

        let parent = repo.find_by_id("g-platform").await.unwrap().unwrap();
        assert!(parent.laddered_goals.iter().any(|g| g.id == created.id));
    }

    #[tokio::test]
    async fn deleting_a_missing_goal_leaves_the_list_unchanged() {
        let repo = repository();
        let before = repo.find_many(GoalCriteria::default()).await.unwrap();
        assert_eq!(repo.delete("g-does-not-exist").await.unwrap(), 0);
        let after = repo.find_many(GoalCriteria::default()).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn missing_goal_is_none() {
        let repo = repository();
        assert!(repo.find_by_id("g-nope").await.unwrap().is_none());
        let updated = repo
            .update(
                "g-nope",
                GoalUpdate {
                    title: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn create_under_unknown_parent_fails() {
        let repo = repository();
        let err = repo
            .create(NewGoal {
                title: "Orphan".to_string(),
                goal_type: "goal".to_string(),
                parent_id: Some("g-ghost".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::UnknownParent(ref id)) if id == "g-ghost"
        ));
    }

    #[tokio::test]
    async fn reparenting_moves_the_subtree() {
        let repo = repository();
        repo.update(
            "g-pipelines",
            GoalUpdate {
                parent_id: Some("g-quality".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        let grandchild = repo.find_by_id("g-flaky-tests").await.unwrap().unwrap();
        assert_eq!(grandchild.path.as_deref(), Some("g-quality/g-pipelines"));
        let moved = repo.find_by_id("g-pipelines").await.unwrap().unwrap();
        assert_eq!(moved.path.as_deref(), Some("g-quality"));
    }

    #[tokio::test]
    async fn deleting_a_parent_detaches_its_subtree() {
        let repo = repository();
        assert_eq!(repo.delete("g-platform").await.unwrap(), 1);

        let child = repo.find_by_id("g-pipelines").await.unwrap().unwrap();
        assert!(child.parent_id.is_none());
        assert!(child.path.is_none());
        let grandchild = repo.find_by_id("g-flaky-tests").await.unwrap().unwrap();
        assert_eq!(grandchild.path.as_deref(), Some("g-pipelines"));
    }

    #[tokio::test]
    async fn find_many_applies_criteria_and_ladders_children() {
        let repo = repository();
        let top = repo
            .find_many(GoalCriteria {
                top_level_only: true,
                ..GoalCriteria::assigned_to("u-grace")
            })
            .await
            .unwrap();
        let ids: Vec<_> = top.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["g-legacy", "g-platform", "g-quality"]);

        let platform = &top[1];
        assert_eq!(platform.user_name.as_deref(), Some("Grace Hopper"));
        assert_eq!(platform.laddered_goals.len(), 2);
        assert!(platform.laddered_goals[0].laddered_goals.is_empty());
    }
}
