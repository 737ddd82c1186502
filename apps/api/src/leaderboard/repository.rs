use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::leaderboard::aggregation::RankedUser;

/// An active related job and how many lessons are tagged with it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobLessonCount {
    pub id: i64,
    pub position: String,
    pub company: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub lesson_count: i64,
}

/// Active users with at least one completion, best first.
pub async fn ranked_users(pool: &PgPool, limit: i64) -> Result<Vec<RankedUser>, sqlx::Error> {
    sqlx::query_as::<_, RankedUser>(
        "SELECT id AS user_id, username, lessons_completed, total_lesson_score AS total_score
         FROM users
         WHERE is_active AND lessons_completed > 0
         ORDER BY total_lesson_score DESC, lessons_completed DESC, id ASC
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Active related jobs with at least one associated lesson, by id.
pub async fn jobs_with_lessons(pool: &PgPool) -> Result<Vec<JobLessonCount>, sqlx::Error> {
    sqlx::query_as::<_, JobLessonCount>(
        "SELECT rj.id, rj.position, rj.company, rj.job_type, rj.experience_level,
                COUNT(lrj.lesson_id) AS lesson_count
         FROM related_jobs rj
         JOIN lesson_related_jobs lrj ON lrj.related_job_id = rj.id
         WHERE rj.is_active
         GROUP BY rj.id
         ORDER BY rj.id",
    )
    .fetch_all(pool)
    .await
}

/// The active related job with the most lessons (possibly zero); lowest id on ties.
pub async fn most_tagged_job(pool: &PgPool) -> Result<Option<JobLessonCount>, sqlx::Error> {
    sqlx::query_as::<_, JobLessonCount>(
        "SELECT rj.id, rj.position, rj.company, rj.job_type, rj.experience_level,
                COUNT(lrj.lesson_id) AS lesson_count
         FROM related_jobs rj
         LEFT JOIN lesson_related_jobs lrj ON lrj.related_job_id = rj.id
         WHERE rj.is_active
         GROUP BY rj.id
         ORDER BY lesson_count DESC, rj.id ASC
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await
}
