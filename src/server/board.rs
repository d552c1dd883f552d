//! Board endpoints

use crate::board::{self, Dashboard, Meeting, ReviewQueue, Task, TaskStatus, User};
use crate::server::error::{ApiError, ApiResult};
use crate::server::AppState;
use crate::storage::{TaskFilter, TaskUpdate};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct Column {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewParams {
    /// Viewer user id; defaults to the signed-in user
    pub user: Option<String>,
}

/// GET /api/dashboard
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<Dashboard>> {
    let tasks = state.store.list_tasks(&TaskFilter::default()).await?;
    let meetings = state.store.meetings().await?;
    let activity = state.store.activity().await?;

    Ok(Json(Dashboard::build(&tasks, meetings, activity)))
}

/// GET /api/tasks?status=&owner=
pub async fn list_tasks(
    State(state): State<AppState>,
    filter: Result<Query<TaskFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(filter) = filter.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Json(state.store.list_tasks(&filter).await?))
}

/// GET /api/board
pub async fn board_columns(State(state): State<AppState>) -> ApiResult<Json<Vec<Column>>> {
    let tasks = state.store.list_tasks(&TaskFilter::default()).await?;
    let columns = board::columns(&tasks)
        .into_iter()
        .map(|(status, tasks)| Column {
            status,
            tasks: tasks.into_iter().cloned().collect(),
        })
        .collect();

    Ok(Json(columns))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.store.get_task(&task_id).await?))
}

/// PATCH /api/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    update: Result<Json<TaskUpdate>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(update) = update.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let task = state.store.update_task(&task_id, update).await?;

    info!(task_id = %task.id, status = %task.status, "Task updated");
    Ok(Json(task))
}

/// POST /api/tasks/{id}/approve
pub async fn approve_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task = state.store.approve_task(&task_id).await?;

    info!(task_id = %task.id, "Task approved");
    Ok(Json(task))
}

/// DELETE /api/tasks/{id}
pub async fn reject_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.remove_task(&task_id).await?;

    info!(task_id = %task_id, "Task rejected");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/meetings
pub async fn list_meetings(State(state): State<AppState>) -> ApiResult<Json<Vec<Meeting>>> {
    Ok(Json(state.store.meetings().await?))
}

/// GET /api/meetings/{id}
pub async fn get_meeting(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> ApiResult<Json<Meeting>> {
    Ok(Json(state.store.get_meeting(&meeting_id).await?))
}

/// GET /api/team
pub async fn team(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.store.team().await?))
}

/// GET /api/review?user=
pub async fn review(
    State(state): State<AppState>,
    params: Result<Query<ReviewParams>, QueryRejection>,
) -> ApiResult<Json<ReviewQueue>> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let viewer = match params.user.as_deref().filter(|id| !id.is_empty()) {
        Some(user_id) => state.store.get_user(user_id).await?,
        None => state.store.current_user().await?,
    };
    let tasks = state.store.list_tasks(&TaskFilter::default()).await?;

    Ok(Json(ReviewQueue::for_viewer(tasks, &viewer)))
}
