use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::lesson::Lesson;
use crate::models::related_job::{CreateRelatedJob, RelatedJob, UpdateRelatedJob};
use crate::models::{MessageResponse, Pagination};
use crate::related_jobs::repository::{self, RelatedJobFilter};
use crate::related_jobs::resolver;
use crate::state::AppState;

const DEFAULT_SUGGESTIONS: i64 = 10;
const MAX_SUGGESTIONS: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub position: String,
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub q: String,
    pub limit: Option<i64>,
}

/// GET /api/v1/related-jobs
pub async fn handle_list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(filter): Query<RelatedJobFilter>,
) -> Result<Json<Vec<RelatedJob>>, AppError> {
    Ok(Json(repository::list(&state.db, &filter, &page).await?))
}

/// POST /api/v1/related-jobs
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateRelatedJob>,
) -> Result<(StatusCode, Json<RelatedJob>), AppError> {
    let job = repository::create(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// POST /api/v1/related-jobs/resolve
///
/// Find-or-create by fuzzy position match. Always succeeds for a non-blank position.
pub async fn handle_resolve(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<RelatedJob>, AppError> {
    let mut tx = state.db.begin().await?;
    let job = resolver::resolve(&mut *tx, &req.position, req.company.as_deref()).await?;
    tx.commit().await?;
    Ok(Json(job))
}

/// GET /api/v1/related-jobs/suggest?q=
///
/// Read-only view of what the resolver would match.
pub async fn handle_suggest(
    State(state): State<AppState>,
    Query(params): Query<SuggestQuery>,
) -> Result<Json<Vec<RelatedJob>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_SUGGESTIONS)
        .clamp(1, MAX_SUGGESTIONS);
    Ok(Json(
        resolver::suggest_matches(&state.db, &params.q, limit).await?,
    ))
}

/// GET /api/v1/related-jobs/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RelatedJob>, AppError> {
    repository::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Related job {id} not found")))
}

/// PUT /api/v1/related-jobs/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRelatedJob>,
) -> Result<Json<RelatedJob>, AppError> {
    repository::update(&state.db, id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Related job {id} not found")))
}

/// DELETE /api/v1/related-jobs/:id (soft delete)
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !repository::deactivate(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Related job {id} not found")));
    }
    Ok(Json(MessageResponse::new("Related job deactivated")))
}

/// GET /api/v1/related-jobs/:id/lessons
pub async fn handle_lessons(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Lesson>>, AppError> {
    if repository::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound(format!("Related job {id} not found")));
    }
    Ok(Json(repository::lessons_for_job(&state.db, id).await?))
}
