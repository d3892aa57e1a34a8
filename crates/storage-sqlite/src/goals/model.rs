//! Database models for goals.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::warn;

use ambitions_core::goals::{Goal, GoalStatus};
use ambitions_core::users::normalize_image_path;

/// Database model for goals
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalDB {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub goal_type: String,
    pub status: String,
    pub parent_id: Option<String>,
    pub path: Option<String>,
    pub assigned_to: Option<String>,
    pub created_by: Option<String>,
    pub period_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Assignee display columns pulled in through the `users` left join.
#[derive(Queryable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssigneeDB {
    pub name: String,
    pub lastname: String,
    pub image: Option<String>,
}

impl GoalDB {
    pub fn into_goal(self, assignee: Option<AssigneeDB>) -> Goal {
        let status = self.status.parse::<GoalStatus>().unwrap_or_else(|_| {
            warn!(
                "Goal {} has unknown status '{}', treating as draft",
                self.id, self.status
            );
            GoalStatus::Draft
        });
        let (user_name, user_image) = match assignee {
            Some(a) => (
                Some(format!("{} {}", a.name, a.lastname).trim().to_string()),
                normalize_image_path(a.image.as_deref()),
            ),
            None => (None, None),
        };

        Goal {
            id: self.id,
            title: self.title,
            description: self.description,
            goal_type: self.goal_type,
            status,
            parent_id: self.parent_id,
            path: self.path,
            assigned_to: self.assigned_to,
            created_by: self.created_by,
            period_id: self.period_id,
            created_at: self.created_at.and_utc(),
            updated_at: self.updated_at.and_utc(),
            user_name,
            user_image,
            laddered_goals: Vec::new(),
        }
    }
}

impl From<GoalDB> for Goal {
    fn from(db: GoalDB) -> Self {
        db.into_goal(None)
    }
}

impl From<&Goal> for GoalDB {
    fn from(goal: &Goal) -> Self {
        Self {
            id: goal.id.clone(),
            title: goal.title.clone(),
            description: goal.description.clone(),
            goal_type: goal.goal_type.clone(),
            status: goal.status.as_str().to_string(),
            parent_id: goal.parent_id.clone(),
            path: goal.path.clone(),
            assigned_to: goal.assigned_to.clone(),
            created_by: goal.created_by.clone(),
            period_id: goal.period_id.clone(),
            created_at: goal.created_at.naive_utc(),
            updated_at: goal.updated_at.naive_utc(),
        }
    }
}
