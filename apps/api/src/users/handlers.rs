use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::errors::AppError;
use crate::leaderboard::aggregation::average_score;
use crate::models::user::{UpdateUser, UserResponse, UserStats};
use crate::models::{MessageResponse, Pagination};
use crate::state::AppState;
use crate::users::progress::{self, CompletionReceipt};
use crate::users::repository;

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("User {id} not found"))
}

/// GET /api/v1/users
pub async fn handle_list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = repository::list(&state.db, &page).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/v1/users/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    repository::find_by_id(&state.db, id)
        .await?
        .map(|u| Json(u.into()))
        .ok_or_else(|| not_found(id))
}

/// PUT /api/v1/users/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUser>,
) -> Result<Json<UserResponse>, AppError> {
    if req.username.as_deref().is_some_and(|u| u.trim().is_empty()) {
        return Err(AppError::Validation("username cannot be empty".to_string()));
    }
    repository::update(&state.db, id, &req)
        .await?
        .map(|u| Json(u.into()))
        .ok_or_else(|| not_found(id))
}

/// DELETE /api/v1/users/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !repository::delete(&state.db, id).await? {
        return Err(not_found(id));
    }
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// GET /api/v1/users/:id/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserStats>, AppError> {
    let user = repository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(UserStats {
        user_id: user.id,
        average_score: average_score(user.total_lesson_score, user.lessons_completed),
        username: user.username,
        lessons_completed: user.lessons_completed,
        total_lesson_score: user.total_lesson_score,
    }))
}

/// POST /api/v1/users/:id/reset-progress
pub async fn handle_reset_progress(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    repository::reset_progress(&state.db, id)
        .await?
        .map(|u| Json(u.into()))
        .ok_or_else(|| not_found(id))
}

/// POST /api/v1/users/:id/lessons/:lesson_id/complete
pub async fn handle_complete_lesson(
    State(state): State<AppState>,
    Path((user_id, lesson_id)): Path<(i64, i64)>,
) -> Result<Json<CompletionReceipt>, AppError> {
    Ok(Json(
        progress::complete_lesson(&state.db, user_id, lesson_id).await?,
    ))
}
