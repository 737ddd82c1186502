use serde::Deserialize;
use sqlx::{PgConnection, PgPool};

use crate::db::contains_pattern;
use crate::errors::AppError;
use crate::models::lesson::Lesson;
use crate::models::related_job::{CreateRelatedJob, RelatedJob, UpdateRelatedJob};
use crate::models::Pagination;

/// Column list shared across queries to avoid repetition.
pub const COLUMNS: &str = "id, position, company, description, job_type, experience_level, \
                           industry, skills_required, is_active, created_at, updated_at";

/// List filters. Text filters are substring matches; `is_active` defaults to true.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelatedJobFilter {
    pub position: Option<String>,
    pub company: Option<String>,
    pub job_type: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<RelatedJob>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM related_jobs WHERE id = $1");
    sqlx::query_as::<_, RelatedJob>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Fetches the rows for `ids`, silently skipping ids that do not exist.
pub async fn find_many(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<RelatedJob>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!("SELECT {COLUMNS} FROM related_jobs WHERE id = ANY($1) ORDER BY id");
    sqlx::query_as::<_, RelatedJob>(&sql)
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
}

pub async fn list(
    pool: &PgPool,
    filter: &RelatedJobFilter,
    page: &Pagination,
) -> Result<Vec<RelatedJob>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM related_jobs
         WHERE is_active = $1
           AND ($2::text IS NULL OR position ILIKE $2)
           AND ($3::text IS NULL OR company ILIKE $3)
           AND ($4::text IS NULL OR job_type ILIKE $4)
         ORDER BY id
         OFFSET $5 LIMIT $6"
    );
    sqlx::query_as::<_, RelatedJob>(&sql)
        .bind(filter.is_active.unwrap_or(true))
        .bind(filter.position.as_deref().map(contains_pattern))
        .bind(filter.company.as_deref().map(contains_pattern))
        .bind(filter.job_type.as_deref().map(contains_pattern))
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(pool)
        .await
}

/// Explicit creation. Unlike the resolver, an exact (case-insensitive)
/// position + company duplicate is rejected.
pub async fn create(pool: &PgPool, input: &CreateRelatedJob) -> Result<RelatedJob, AppError> {
    let position = input.position.trim();
    if position.is_empty() {
        return Err(AppError::Validation("position cannot be empty".to_string()));
    }
    let company = input.company.as_deref().map(str::trim).filter(|c| !c.is_empty());

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM related_jobs
            WHERE LOWER(position) = LOWER($1)
              AND LOWER(COALESCE(company, '')) = LOWER(COALESCE($2, ''))
        )",
    )
    .bind(position)
    .bind(company)
    .fetch_one(pool)
    .await?;
    if exists {
        return Err(AppError::Conflict(format!(
            "Related job '{position}' already exists for this company"
        )));
    }

    let sql = format!(
        "INSERT INTO related_jobs
            (position, company, description, job_type, experience_level, industry, skills_required)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {COLUMNS}"
    );
    Ok(sqlx::query_as::<_, RelatedJob>(&sql)
        .bind(position)
        .bind(company)
        .bind(&input.description)
        .bind(&input.job_type)
        .bind(&input.experience_level)
        .bind(&input.industry)
        .bind(&input.skills_required)
        .fetch_one(pool)
        .await?)
}

/// Applies non-`None` fields. Returns `None` if no row with `id` exists.
pub async fn update(
    pool: &PgPool,
    id: i64,
    input: &UpdateRelatedJob,
) -> Result<Option<RelatedJob>, AppError> {
    if input.position.as_deref().is_some_and(|p| p.trim().is_empty()) {
        return Err(AppError::Validation("position cannot be empty".to_string()));
    }
    let sql = format!(
        "UPDATE related_jobs SET
            position = COALESCE($2, position),
            company = COALESCE($3, company),
            description = COALESCE($4, description),
            job_type = COALESCE($5, job_type),
            experience_level = COALESCE($6, experience_level),
            industry = COALESCE($7, industry),
            skills_required = COALESCE($8, skills_required),
            is_active = COALESCE($9, is_active),
            updated_at = NOW()
         WHERE id = $1
         RETURNING {COLUMNS}"
    );
    Ok(sqlx::query_as::<_, RelatedJob>(&sql)
        .bind(id)
        .bind(input.position.as_deref().map(str::trim))
        .bind(&input.company)
        .bind(&input.description)
        .bind(&input.job_type)
        .bind(&input.experience_level)
        .bind(&input.industry)
        .bind(&input.skills_required)
        .bind(input.is_active)
        .fetch_optional(pool)
        .await?)
}

/// Soft delete: flips `is_active` off and keeps lesson associations.
/// Returns `true` if the row exists.
pub async fn deactivate(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE related_jobs SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Lessons tagged with the given job, ordered by title.
pub async fn lessons_for_job(pool: &PgPool, job_id: i64) -> Result<Vec<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(
        "SELECT l.id, l.title, l.description, l.summary, l.category, l.filename,
                l.duration_minutes, l.difficulty_level, l.lesson_score,
                l.created_at, l.updated_at
         FROM lessons l
         JOIN lesson_related_jobs lrj ON lrj.lesson_id = l.id
         WHERE lrj.related_job_id = $1
         ORDER BY l.title",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await
}
