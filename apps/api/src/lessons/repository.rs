use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use tracing::info;

use crate::db::contains_pattern;
use crate::errors::AppError;
use crate::lessons::associations::{related_jobs_for_lesson, sync_associations, AssociationUpdate};
use crate::models::lesson::{CreateLesson, Difficulty, Lesson, LessonResponse, UpdateLesson};
use crate::models::related_job::RelatedJobSummary;
use crate::models::Pagination;

/// Column list shared across queries to avoid repetition.
pub const COLUMNS: &str = "id, title, description, summary, category, filename, duration_minutes, \
                           difficulty_level, lesson_score, created_at, updated_at";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LessonFilter {
    /// Substring match.
    pub category: Option<String>,
    pub difficulty_level: Option<Difficulty>,
}

/// Field-level checks shared by create and update.
fn validate_fields(
    title: Option<&str>,
    category: Option<&str>,
    lesson_score: Option<i32>,
    duration_minutes: Option<i32>,
) -> Result<(), AppError> {
    if title.is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if category.is_some_and(|c| c.trim().is_empty()) {
        return Err(AppError::Validation("category cannot be empty".to_string()));
    }
    if lesson_score.is_some_and(|s| s < 0) {
        return Err(AppError::Validation(
            "Lesson score cannot be negative".to_string(),
        ));
    }
    if duration_minutes.is_some_and(|d| d < 0) {
        return Err(AppError::Validation(
            "duration_minutes cannot be negative".to_string(),
        ));
    }
    Ok(())
}

async fn title_taken(
    conn: &mut PgConnection,
    title: &str,
    exclude_id: Option<i64>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM lessons WHERE title = $1 AND ($2::bigint IS NULL OR id <> $2))",
    )
    .bind(title)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await
}

async fn with_jobs(conn: &mut PgConnection, lesson: Lesson) -> Result<LessonResponse, sqlx::Error> {
    let jobs = related_jobs_for_lesson(conn, lesson.id).await?;
    Ok(LessonResponse {
        lesson,
        related_jobs: jobs.iter().map(RelatedJobSummary::from).collect(),
    })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Lesson>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1");
    sqlx::query_as::<_, Lesson>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Lesson plus its related jobs.
pub async fn find_with_jobs(pool: &PgPool, id: i64) -> Result<Option<LessonResponse>, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    let sql = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1");
    let lesson = sqlx::query_as::<_, Lesson>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match lesson {
        Some(lesson) => Ok(Some(with_jobs(&mut *conn, lesson).await?)),
        None => Ok(None),
    }
}

/// Inserts the lesson and its associations in one transaction.
pub async fn create(pool: &PgPool, input: CreateLesson) -> Result<LessonResponse, AppError> {
    validate_fields(
        Some(&input.title),
        Some(&input.category),
        input.lesson_score,
        input.duration_minutes,
    )?;
    let title = input.title.trim();

    let mut tx = pool.begin().await?;

    if title_taken(&mut *tx, title, None).await? {
        return Err(AppError::Conflict(
            "Lesson with this title already exists".to_string(),
        ));
    }

    let sql = format!(
        "INSERT INTO lessons
            (title, description, summary, category, filename, duration_minutes,
             difficulty_level, lesson_score)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {COLUMNS}"
    );
    let lesson = sqlx::query_as::<_, Lesson>(&sql)
        .bind(title)
        .bind(&input.description)
        .bind(&input.summary)
        .bind(input.category.trim())
        .bind(&input.filename)
        .bind(input.duration_minutes)
        .bind(input.difficulty_level.unwrap_or_default())
        .bind(input.lesson_score)
        .fetch_one(&mut *tx)
        .await?;

    let update = AssociationUpdate::from_payload(input.related_job_ids, input.related_job_positions);
    sync_associations(&mut *tx, lesson.id, &update).await?;

    let response = with_jobs(&mut *tx, lesson).await?;
    tx.commit().await?;

    info!("Created lesson {} ('{}')", response.lesson.id, response.lesson.title);
    Ok(response)
}

/// Applies non-`None` fields and, when job data is present, replaces the
/// association set. Returns `None` if the lesson does not exist.
pub async fn update(
    pool: &PgPool,
    id: i64,
    input: UpdateLesson,
) -> Result<Option<LessonResponse>, AppError> {
    validate_fields(
        input.title.as_deref(),
        input.category.as_deref(),
        input.lesson_score,
        input.duration_minutes,
    )?;
    let title = input.title.as_deref().map(str::trim);

    let mut tx = pool.begin().await?;

    if let Some(title) = title {
        if title_taken(&mut *tx, title, Some(id)).await? {
            return Err(AppError::Conflict(
                "Lesson with this title already exists".to_string(),
            ));
        }
    }

    let sql = format!(
        "UPDATE lessons SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            summary = COALESCE($4, summary),
            category = COALESCE($5, category),
            filename = COALESCE($6, filename),
            duration_minutes = COALESCE($7, duration_minutes),
            difficulty_level = COALESCE($8, difficulty_level),
            lesson_score = COALESCE($9, lesson_score),
            updated_at = NOW()
         WHERE id = $1
         RETURNING {COLUMNS}"
    );
    let lesson = sqlx::query_as::<_, Lesson>(&sql)
        .bind(id)
        .bind(title)
        .bind(&input.description)
        .bind(&input.summary)
        .bind(input.category.as_deref().map(str::trim))
        .bind(&input.filename)
        .bind(input.duration_minutes)
        .bind(input.difficulty_level)
        .bind(input.lesson_score)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(lesson) = lesson else {
        return Ok(None);
    };

    let update = AssociationUpdate::from_payload(input.related_job_ids, input.related_job_positions);
    sync_associations(&mut *tx, lesson.id, &update).await?;

    let response = with_jobs(&mut *tx, lesson).await?;
    tx.commit().await?;
    Ok(Some(response))
}

/// Replaces associations only, leaving lesson fields untouched.
pub async fn replace_associations(
    pool: &PgPool,
    id: i64,
    update: &AssociationUpdate,
) -> Result<Option<LessonResponse>, AppError> {
    let mut tx = pool.begin().await?;
    let sql = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1 FOR UPDATE");
    let Some(lesson) = sqlx::query_as::<_, Lesson>(&sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        return Ok(None);
    };
    sync_associations(&mut *tx, id, update).await?;
    let response = with_jobs(&mut *tx, lesson).await?;
    tx.commit().await?;
    Ok(Some(response))
}

/// Returns `true` if a row was deleted. Association rows cascade.
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list(
    pool: &PgPool,
    filter: &LessonFilter,
    page: &Pagination,
) -> Result<Vec<Lesson>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM lessons
         WHERE ($1::text IS NULL OR category ILIKE $1)
           AND ($2::difficulty_level IS NULL OR difficulty_level = $2)
         ORDER BY id
         OFFSET $3 LIMIT $4"
    );
    sqlx::query_as::<_, Lesson>(&sql)
        .bind(filter.category.as_deref().map(contains_pattern))
        .bind(filter.difficulty_level)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(pool)
        .await
}

/// Substring search over title, description and category.
pub async fn search(pool: &PgPool, term: &str, page: &Pagination) -> Result<Vec<Lesson>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM lessons
         WHERE title ILIKE $1 OR description ILIKE $1 OR category ILIKE $1
         ORDER BY id
         OFFSET $2 LIMIT $3"
    );
    sqlx::query_as::<_, Lesson>(&sql)
        .bind(contains_pattern(term))
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(pool)
        .await
}

pub async fn count(pool: &PgPool, category: Option<&str>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE ($1::text IS NULL OR category ILIKE $1)")
        .bind(category.map(contains_pattern))
        .fetch_one(pool)
        .await
}
