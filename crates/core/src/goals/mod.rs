//! Goals module - domain models, services, and traits.

mod goals_model;
mod goals_service;
mod goals_traits;

#[cfg(test)]
mod goals_service_tests;

pub use goals_model::{
    FilterOption, Goal, GoalCriteria, GoalFilters, GoalStatus, GoalUpdate, ManagerAmbition,
    ManagerAmbitionsData, NewGoal, StatusStyle, GOAL_PATH_SEPARATOR, rebase_path,
};
pub use goals_service::{build_goal_filters, GoalService};
pub use goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
