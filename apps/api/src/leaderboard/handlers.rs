use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::leaderboard::aggregation::{
    self, best_job_estimates, clamp_global_limit, clamp_per_job_limit, JobPerformer,
    LeaderboardEntry,
};
use crate::leaderboard::repository::{self, JobLessonCount};
use crate::state::AppState;
use crate::users::repository as users;

#[derive(Debug, Deserialize)]
pub struct GlobalQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ByJobQuery {
    pub limit_per_job: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct JobLeaderboard {
    pub job_info: JobLessonCount,
    pub top_performers: Vec<JobPerformer>,
}

#[derive(Debug, Serialize)]
pub struct BestJob {
    pub user_id: i64,
    pub username: String,
    pub lessons_completed: i64,
    pub total_lesson_score: i64,
    pub best_job: JobLessonCount,
    pub estimated_job_score: f64,
    pub estimated_completed_lessons: i64,
}

/// GET /api/v1/leaderboard?limit=
pub async fn handle_global(
    State(state): State<AppState>,
    Query(params): Query<GlobalQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let limit = clamp_global_limit(params.limit);
    let users = repository::ranked_users(&state.db, limit).await?;
    Ok(Json(aggregation::rank(users)))
}

/// GET /api/v1/leaderboard/by-related-job?limit_per_job=
///
/// Keyed by position; if two active jobs share a position the lower id wins.
pub async fn handle_by_related_job(
    State(state): State<AppState>,
    Query(params): Query<ByJobQuery>,
) -> Result<Json<BTreeMap<String, JobLeaderboard>>, AppError> {
    let limit = clamp_per_job_limit(params.limit_per_job);
    let pool = repository::ranked_users(&state.db, limit * 2).await?;
    let jobs = repository::jobs_with_lessons(&state.db).await?;

    let mut boards = BTreeMap::new();
    for job in jobs {
        let top_performers = aggregation::top_performers(&pool, job.lesson_count, limit as usize);
        if top_performers.is_empty() {
            continue;
        }
        if boards.contains_key(&job.position) {
            debug!("Skipping related job {} with duplicate position '{}'", job.id, job.position);
            continue;
        }
        boards.insert(
            job.position.clone(),
            JobLeaderboard {
                job_info: job,
                top_performers,
            },
        );
    }

    Ok(Json(boards))
}

/// GET /api/v1/leaderboard/users/:id/best-job
pub async fn handle_best_job(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<BestJob>, AppError> {
    let user = users::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    if user.lessons_completed == 0 {
        return Err(AppError::NotFound(
            "User has not completed any lessons".to_string(),
        ));
    }

    let best_job = repository::most_tagged_job(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No active related jobs".to_string()))?;

    let (estimated_job_score, estimated_completed_lessons) =
        best_job_estimates(user.total_lesson_score, user.lessons_completed);

    Ok(Json(BestJob {
        user_id: user.id,
        username: user.username,
        lessons_completed: user.lessons_completed,
        total_lesson_score: user.total_lesson_score,
        best_job,
        estimated_job_score,
        estimated_completed_lessons,
    }))
}
