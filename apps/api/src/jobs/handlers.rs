use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::jobs::repository;
use crate::models::job::{CreateJob, Job, JobFilter, JobStatistics, UpdateJob};
use crate::models::{MessageResponse, Pagination};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Job {id} not found"))
}

/// POST /api/v1/jobs
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateJob>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = repository::create(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs
pub async fn handle_list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(filter): Query<JobFilter>,
) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(repository::list(&state.db, &filter, &page).await?))
}

/// GET /api/v1/jobs/active
pub async fn handle_active(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Job>>, AppError> {
    let filter = JobFilter {
        is_active: Some(true),
        ..JobFilter::default()
    };
    Ok(Json(repository::list(&state.db, &filter, &page).await?))
}

/// GET /api/v1/jobs/remote
pub async fn handle_remote(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Job>>, AppError> {
    let filter = JobFilter {
        remote_option: Some(true),
        is_active: Some(true),
        ..JobFilter::default()
    };
    Ok(Json(repository::list(&state.db, &filter, &page).await?))
}

/// GET /api/v1/jobs/search?q=
pub async fn handle_search(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(repository::search(&state.db, params.q.trim(), &page).await?))
}

/// GET /api/v1/jobs/count
pub async fn handle_count(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
) -> Result<Json<CountResponse>, AppError> {
    let count = repository::count(&state.db, &filter).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /api/v1/jobs/statistics
pub async fn handle_statistics(State(state): State<AppState>) -> Result<Json<JobStatistics>, AppError> {
    Ok(Json(repository::statistics(&state.db).await?))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Job>, AppError> {
    repository::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// PUT /api/v1/jobs/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateJob>,
) -> Result<Json<Job>, AppError> {
    repository::update(&state.db, id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// PATCH /api/v1/jobs/:id/activate
pub async fn handle_activate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Job>, AppError> {
    repository::set_active(&state.db, id, true)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// PATCH /api/v1/jobs/:id/deactivate
pub async fn handle_deactivate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Job>, AppError> {
    repository::set_active(&state.db, id, false)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !repository::delete(&state.db, id).await? {
        return Err(not_found(id));
    }
    Ok(Json(MessageResponse::new("Job deleted successfully")))
}
