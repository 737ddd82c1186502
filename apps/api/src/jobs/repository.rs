use std::collections::BTreeMap;

use sqlx::PgPool;
use tracing::info;

use crate::db::contains_pattern;
use crate::errors::AppError;
use crate::models::job::{CreateJob, Job, JobFilter, JobStatistics, UpdateJob};
use crate::models::Pagination;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, position, company, description, job_criteria, location, salary_range, \
                       job_type, remote_option, experience_level, is_active, recruiter_id, \
                       created_at, updated_at";

/// Filter predicate over `$1..=$7`, in [`JobFilter`] field order.
const FILTER_SQL: &str = "($1::text IS NULL OR company ILIKE $1)
           AND ($2::text IS NULL OR location ILIKE $2)
           AND ($3::text IS NULL OR job_type = $3)
           AND ($4::text IS NULL OR experience_level = $4)
           AND ($5::bool IS NULL OR remote_option = $5)
           AND ($6::bool IS NULL OR is_active = $6)
           AND ($7::bigint IS NULL OR recruiter_id = $7)";

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Job>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
    sqlx::query_as::<_, Job>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Fails with `Conflict` when a posting with the same position and company exists.
pub async fn create(pool: &PgPool, input: &CreateJob) -> Result<Job, AppError> {
    require_text("position", &input.position)?;
    require_text("company", &input.company)?;
    require_text("job_criteria", &input.job_criteria)?;

    let mut tx = pool.begin().await?;

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM jobs WHERE position = $1 AND company = $2)",
    )
    .bind(input.position.trim())
    .bind(input.company.trim())
    .fetch_one(&mut *tx)
    .await?;
    if exists {
        return Err(AppError::Conflict(
            "Job with this position and company already exists".to_string(),
        ));
    }

    let sql = format!(
        "INSERT INTO jobs
            (position, company, description, job_criteria, location, salary_range,
             job_type, remote_option, experience_level, is_active, recruiter_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING {COLUMNS}"
    );
    let job = sqlx::query_as::<_, Job>(&sql)
        .bind(input.position.trim())
        .bind(input.company.trim())
        .bind(&input.description)
        .bind(&input.job_criteria)
        .bind(&input.location)
        .bind(&input.salary_range)
        .bind(&input.job_type)
        .bind(input.remote_option)
        .bind(&input.experience_level)
        .bind(input.is_active)
        .bind(input.recruiter_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    info!("Created job {} ({} at {})", job.id, job.position, job.company);
    Ok(job)
}

/// Newest first.
pub async fn list(pool: &PgPool, filter: &JobFilter, page: &Pagination) -> Result<Vec<Job>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM jobs
         WHERE {FILTER_SQL}
         ORDER BY created_at DESC, id DESC
         OFFSET $8 LIMIT $9"
    );
    sqlx::query_as::<_, Job>(&sql)
        .bind(filter.company.as_deref().map(contains_pattern))
        .bind(filter.location.as_deref().map(contains_pattern))
        .bind(&filter.job_type)
        .bind(&filter.experience_level)
        .bind(filter.remote_option)
        .bind(filter.is_active)
        .bind(filter.recruiter_id)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(pool)
        .await
}

pub async fn count(pool: &PgPool, filter: &JobFilter) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM jobs WHERE {FILTER_SQL}");
    sqlx::query_scalar(&sql)
        .bind(filter.company.as_deref().map(contains_pattern))
        .bind(filter.location.as_deref().map(contains_pattern))
        .bind(&filter.job_type)
        .bind(&filter.experience_level)
        .bind(filter.remote_option)
        .bind(filter.is_active)
        .bind(filter.recruiter_id)
        .fetch_one(pool)
        .await
}

/// Active postings whose position, company or description contains `term`.
pub async fn search(pool: &PgPool, term: &str, page: &Pagination) -> Result<Vec<Job>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM jobs
         WHERE is_active
           AND (position ILIKE $1 OR company ILIKE $1 OR description ILIKE $1)
         ORDER BY created_at DESC, id DESC
         OFFSET $2 LIMIT $3"
    );
    sqlx::query_as::<_, Job>(&sql)
        .bind(contains_pattern(term))
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(pool)
        .await
}

pub async fn update(pool: &PgPool, id: i64, input: &UpdateJob) -> Result<Option<Job>, AppError> {
    if let Some(position) = &input.position {
        require_text("position", position)?;
    }
    if let Some(company) = &input.company {
        require_text("company", company)?;
    }

    let sql = format!(
        "UPDATE jobs SET
            position = COALESCE($2, position),
            company = COALESCE($3, company),
            description = COALESCE($4, description),
            job_criteria = COALESCE($5, job_criteria),
            location = COALESCE($6, location),
            salary_range = COALESCE($7, salary_range),
            job_type = COALESCE($8, job_type),
            remote_option = COALESCE($9, remote_option),
            experience_level = COALESCE($10, experience_level),
            is_active = COALESCE($11, is_active),
            recruiter_id = COALESCE($12, recruiter_id),
            updated_at = NOW()
         WHERE id = $1
         RETURNING {COLUMNS}"
    );
    let job = sqlx::query_as::<_, Job>(&sql)
        .bind(id)
        .bind(input.position.as_deref().map(str::trim))
        .bind(input.company.as_deref().map(str::trim))
        .bind(&input.description)
        .bind(&input.job_criteria)
        .bind(&input.location)
        .bind(&input.salary_range)
        .bind(&input.job_type)
        .bind(input.remote_option)
        .bind(&input.experience_level)
        .bind(input.is_active)
        .bind(input.recruiter_id)
        .fetch_optional(pool)
        .await?;
    Ok(job)
}

pub async fn set_active(pool: &PgPool, id: i64, active: bool) -> Result<Option<Job>, sqlx::Error> {
    let sql = format!(
        "UPDATE jobs SET is_active = $2, updated_at = NOW()
         WHERE id = $1
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Job>(&sql)
        .bind(id)
        .bind(active)
        .fetch_optional(pool)
        .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Totals plus per-type and per-level counts among active postings.
pub async fn statistics(pool: &PgPool) -> Result<JobStatistics, sqlx::Error> {
    let (total_jobs, active_jobs, remote_jobs): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*),
                COUNT(*) FILTER (WHERE is_active),
                COUNT(*) FILTER (WHERE is_active AND remote_option)
         FROM jobs",
    )
    .fetch_one(pool)
    .await?;

    let job_types: Vec<(String, i64)> = sqlx::query_as(
        "SELECT job_type, COUNT(*) FROM jobs WHERE is_active GROUP BY job_type",
    )
    .fetch_all(pool)
    .await?;

    let experience_levels: Vec<(String, i64)> = sqlx::query_as(
        "SELECT experience_level, COUNT(*) FROM jobs WHERE is_active GROUP BY experience_level",
    )
    .fetch_all(pool)
    .await?;

    Ok(JobStatistics {
        total_jobs,
        active_jobs,
        remote_jobs,
        job_types: job_types.into_iter().collect::<BTreeMap<_, _>>(),
        experience_levels: experience_levels.into_iter().collect::<BTreeMap<_, _>>(),
    })
}
