use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assistant;
use crate::auth::extractor::{ActiveUser, AuthUser};
use crate::errors::AppError;
use crate::lessons::associations::AssociationUpdate;
use crate::lessons::repository::{self, LessonFilter};
use crate::models::lesson::{CreateLesson, Lesson, LessonResponse, UpdateLesson};
use crate::models::{MessageResponse, Pagination};
use crate::state::AppState;
use crate::users::progress::{self, CompletionReceipt};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct AutoTagResponse {
    pub suggested_positions: Vec<String>,
    pub lesson: LessonResponse,
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Lesson {id} not found"))
}

/// POST /api/v1/lessons
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateLesson>,
) -> Result<(StatusCode, Json<LessonResponse>), AppError> {
    let lesson = repository::create(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// GET /api/v1/lessons?skip=&limit=&category=&difficulty_level=
pub async fn handle_list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(filter): Query<LessonFilter>,
) -> Result<Json<Vec<Lesson>>, AppError> {
    Ok(Json(repository::list(&state.db, &filter, &page).await?))
}

/// GET /api/v1/lessons/search?q=
pub async fn handle_search(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Lesson>>, AppError> {
    Ok(Json(repository::search(&state.db, params.q.trim(), &page).await?))
}

/// GET /api/v1/lessons/count?category=
pub async fn handle_count(
    State(state): State<AppState>,
    Query(params): Query<CountQuery>,
) -> Result<Json<CountResponse>, AppError> {
    let count = repository::count(&state.db, params.category.as_deref()).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /api/v1/lessons/category/:category
pub async fn handle_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Lesson>>, AppError> {
    let filter = LessonFilter {
        category: Some(category),
        ..LessonFilter::default()
    };
    Ok(Json(repository::list(&state.db, &filter, &page).await?))
}

/// GET /api/v1/lessons/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LessonResponse>, AppError> {
    repository::find_with_jobs(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// PUT /api/v1/lessons/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateLesson>,
) -> Result<Json<LessonResponse>, AppError> {
    repository::update(&state.db, id, req)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// DELETE /api/v1/lessons/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !repository::delete(&state.db, id).await? {
        return Err(not_found(id));
    }
    Ok(Json(MessageResponse::new("Lesson deleted successfully")))
}

/// POST /api/v1/lessons/:id/complete
///
/// Completes the lesson for the authenticated user. Inactive accounts get 403.
pub async fn handle_complete(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<i64>,
) -> Result<Json<CompletionReceipt>, AppError> {
    Ok(Json(progress::complete_lesson(&state.db, user.id, id).await?))
}

/// POST /api/v1/lessons/:id/related-jobs/suggest
///
/// Asks the model for positions and adds them to the lesson's current
/// related jobs. Existing ids are passed along because the association
/// update replaces the set.
pub async fn handle_auto_tag(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<AutoTagResponse>, AppError> {
    let current = repository::find_with_jobs(&state.db, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let lesson = &current.lesson;
    let positions = assistant::suggest_positions(
        &state.llm,
        &lesson.title,
        lesson.description.as_deref().unwrap_or_default(),
        &lesson.category,
    )
    .await?;

    let update = AssociationUpdate::Replace {
        job_ids: current.related_jobs.iter().map(|j| j.id).collect(),
        positions: positions.clone(),
    };
    let updated = repository::replace_associations(&state.db, id, &update)
        .await?
        .ok_or_else(|| not_found(id))?;

    info!(
        "Auto-tagged lesson {id} with {} suggested position(s)",
        positions.len()
    );
    Ok(Json(AutoTagResponse {
        suggested_positions: positions,
        lesson: updated,
    }))
}
