use std::sync::Arc;

use crate::{
    auth::SessionUser,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use ambitions_core::goals::{Goal, GoalFilters, GoalUpdate, ManagerAmbitionsData, NewGoal};

fn required_id(id: &str) -> ApiResult<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::BadRequest("Goal id is required".to_string()));
    }
    Ok(id)
}

async fn get_goals(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionUser>,
) -> ApiResult<Json<Vec<Goal>>> {
    let goals = state.goal_service.get_goals(Some(&session.email)).await?;
    Ok(Json(goals))
}

async fn get_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Option<Goal>>> {
    let goal = state.goal_service.get_goal(required_id(&id)?).await?;
    Ok(Json(goal))
}

async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionUser>,
    Json(goal): Json<NewGoal>,
) -> ApiResult<Json<Goal>> {
    let g = state.goal_service.create_goal(&session.email, goal).await?;
    Ok(Json(g))
}

async fn update_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionUser>,
    Json(update): Json<GoalUpdate>,
) -> ApiResult<Json<Option<Goal>>> {
    let g = state
        .goal_service
        .update_goal(&session.email, required_id(&id)?, update)
        .await?;
    Ok(Json(g))
}

async fn delete_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let _ = state.goal_service.delete_goal(required_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_goal_filters(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionUser>,
) -> ApiResult<Json<GoalFilters>> {
    let filters = state
        .goal_service
        .get_goal_filters(Some(&session.email))
        .await?;
    Ok(Json(filters))
}

async fn get_manager_ambitions(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionUser>,
) -> ApiResult<Json<ManagerAmbitionsData>> {
    let data = state
        .goal_service
        .get_manager_ambitions(&session.email)
        .await?;
    Ok(Json(data))
}

/// Unauthenticated listing of top-level goals.
pub async fn get_ambitions(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Goal>>> {
    let goals = state.goal_service.get_ambitions().await?;
    Ok(Json(goals))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/goals", get(get_goals).post(create_goal))
        .route("/goals/filters", get(get_goal_filters))
        .route("/goals/manager-ambitions", get(get_manager_ambitions))
        .route(
            "/goals/{id}",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
}
