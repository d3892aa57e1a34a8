//! Goals domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

/// Separator used in the materialized ancestor `path`.
pub const GOAL_PATH_SEPARATOR: char = '/';

/// Lifecycle status of a goal.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Draft,
    AwaitingApproval,
    Approved,
    Completed,
    Archived,
}

/// Presentation style a status is rendered with. Each status has exactly one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusStyle {
    Neutral,
    Warning,
    Info,
    Success,
    Muted,
}

impl GoalStatus {
    pub const ALL: [GoalStatus; 5] = [
        GoalStatus::Draft,
        GoalStatus::AwaitingApproval,
        GoalStatus::Approved,
        GoalStatus::Completed,
        GoalStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Draft => "draft",
            GoalStatus::AwaitingApproval => "awaiting_approval",
            GoalStatus::Approved => "approved",
            GoalStatus::Completed => "completed",
            GoalStatus::Archived => "archived",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GoalStatus::Draft => "Draft",
            GoalStatus::AwaitingApproval => "Awaiting approval",
            GoalStatus::Approved => "Approved",
            GoalStatus::Completed => "Completed",
            GoalStatus::Archived => "Archived",
        }
    }

    pub fn style(&self) -> StatusStyle {
        match self {
            GoalStatus::Draft => StatusStyle::Neutral,
            GoalStatus::AwaitingApproval => StatusStyle::Warning,
            GoalStatus::Approved => StatusStyle::Info,
            GoalStatus::Completed => StatusStyle::Success,
            GoalStatus::Archived => StatusStyle::Muted,
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GoalStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Unknown goal status '{}'",
                    s
                )))
            })
    }
}

/// Domain model representing a goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub goal_type: String,
    pub status: GoalStatus,
    pub parent_id: Option<String>,
    pub path: Option<String>,
    pub assigned_to: Option<String>,
    pub created_by: Option<String>,
    pub period_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_image: Option<String>,
    #[serde(default)]
    pub laddered_goals: Vec<Goal>,
}

impl Goal {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Ancestor ids from the root down to the direct parent.
    pub fn ancestor_ids(&self) -> Vec<&str> {
        self.path
            .as_deref()
            .map(|p| {
                p.split(GOAL_PATH_SEPARATOR)
                    .filter(|segment| !segment.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Path a child of this goal gets.
    pub fn child_path(&self) -> String {
        match self.path.as_deref() {
            Some(p) if !p.is_empty() => format!("{}{}{}", p, GOAL_PATH_SEPARATOR, self.id),
            _ => self.id.clone(),
        }
    }
}

/// Moves `path` from under `old_prefix` to under `new_prefix`.
///
/// Returns `None` for paths outside `old_prefix`. A `new_prefix` of `None`
/// detaches the subtree, so a direct child ends up with no path at all.
pub fn rebase_path(path: &str, old_prefix: &str, new_prefix: Option<&str>) -> Option<Option<String>> {
    let rest = if path == old_prefix {
        ""
    } else {
        path.strip_prefix(old_prefix)?
            .strip_prefix(GOAL_PATH_SEPARATOR)?
    };

    let rebased = match (new_prefix, rest.is_empty()) {
        (Some(prefix), true) => Some(prefix.to_string()),
        (Some(prefix), false) => Some(format!("{}{}{}", prefix, GOAL_PATH_SEPARATOR, rest)),
        (None, true) => None,
        (None, false) => Some(rest.to_string()),
    };
    Some(rebased)
}

/// Input model for creating a new goal
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type", default = "default_goal_type")]
    pub goal_type: String,
    #[serde(default)]
    pub status: GoalStatus,
    pub parent_id: Option<String>,
    pub period_id: Option<String>,
    pub assigned_to: Option<String>,
    pub created_by: Option<String>,
}

fn default_goal_type() -> String {
    "goal".to_string()
}

impl NewGoal {
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title".to_string()).into());
        }
        if self.goal_type.trim().is_empty() {
            return Err(ValidationError::MissingField("type".to_string()).into());
        }
        Ok(())
    }
}

/// Partial update for a goal. Absent fields stay unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub goal_type: Option<String>,
    pub status: Option<GoalStatus>,
    pub parent_id: Option<String>,
    pub period_id: Option<String>,
    pub assigned_to: Option<String>,
}

impl GoalUpdate {
    pub fn validate(&self) -> crate::Result<()> {
        if matches!(self.title.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(ValidationError::InvalidInput("title cannot be empty".to_string()).into());
        }
        Ok(())
    }

    /// Applies the update onto an existing goal, refreshing `updated_at`.
    pub fn apply_to(self, goal: &mut Goal) {
        if let Some(title) = self.title {
            goal.title = title;
        }
        if let Some(description) = self.description {
            goal.description = Some(description);
        }
        if let Some(goal_type) = self.goal_type {
            goal.goal_type = goal_type;
        }
        if let Some(status) = self.status {
            goal.status = status;
        }
        if let Some(parent_id) = self.parent_id {
            goal.parent_id = Some(parent_id);
        }
        if let Some(period_id) = self.period_id {
            goal.period_id = Some(period_id);
        }
        if let Some(assigned_to) = self.assigned_to {
            goal.assigned_to = Some(assigned_to);
        }
        goal.updated_at = Utc::now();
    }
}

/// Filters accepted by `GoalRepositoryTrait::find_many`. Empty matches all goals.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalCriteria {
    pub assigned_to: Option<String>,
    pub parent_id: Option<String>,
    pub status: Option<GoalStatus>,
    pub period_id: Option<String>,
    #[serde(default)]
    pub top_level_only: bool,
}

impl GoalCriteria {
    pub fn assigned_to(user_id: impl Into<String>) -> Self {
        Self {
            assigned_to: Some(user_id.into()),
            ..Default::default()
        }
    }

    pub fn top_level() -> Self {
        Self {
            top_level_only: true,
            ..Default::default()
        }
    }

    pub fn matches(&self, goal: &Goal) -> bool {
        fn eq(filter: &Option<String>, value: &Option<String>) -> bool {
            filter.is_none() || filter.as_deref() == value.as_deref()
        }

        eq(&self.assigned_to, &goal.assigned_to)
            && eq(&self.parent_id, &goal.parent_id)
            && eq(&self.period_id, &goal.period_id)
            && self.status.map_or(true, |s| s == goal.status)
            && (!self.top_level_only || goal.is_top_level())
    }
}

/// One selectable value in a filter dropdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub count: usize,
}

/// Filter metadata derived from a goal collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalFilters {
    pub statuses: Vec<FilterOption>,
    pub types: Vec<FilterOption>,
    pub owners: Vec<FilterOption>,
    pub periods: Vec<FilterOption>,
}

/// A manager's ambition along with how many goals are laddered into it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagerAmbition {
    pub goal: Goal,
    pub laddered_count: usize,
}

/// Ambitions of the caller's manager that the caller can ladder into.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagerAmbitionsData {
    pub manager: Option<crate::users::User>,
    pub ambitions: Vec<ManagerAmbition>,
}
