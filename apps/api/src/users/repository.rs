//! Repository for the `users` table.

use sqlx::PgPool;

use crate::models::user::{NewUser, UpdateUser, User};
use crate::models::Pagination;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, username, hashed_password, is_active, lessons_completed, \
                       total_lesson_score, created_at, updated_at";

pub async fn create(pool: &PgPool, input: &NewUser) -> Result<User, sqlx::Error> {
    let sql = format!(
        "INSERT INTO users (email, username, hashed_password)
         VALUES ($1, $2, $3)
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(&input.email)
        .bind(&input.username)
        .bind(&input.hashed_password)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
    sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
    sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool, page: &Pagination) -> Result<Vec<User>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM users ORDER BY id OFFSET $1 LIMIT $2");
    sqlx::query_as::<_, User>(&sql)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(pool)
        .await
}

/// Applies non-`None` fields. Returns `None` if no row with `id` exists.
pub async fn update(pool: &PgPool, id: i64, input: &UpdateUser) -> Result<Option<User>, sqlx::Error> {
    let sql = format!(
        "UPDATE users SET
            email = COALESCE($2, email),
            username = COALESCE($3, username),
            is_active = COALESCE($4, is_active),
            updated_at = NOW()
         WHERE id = $1
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(&input.email)
        .bind(&input.username)
        .bind(input.is_active)
        .fetch_optional(pool)
        .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// The only path that lowers the counters.
pub async fn reset_progress(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let sql = format!(
        "UPDATE users SET lessons_completed = 0, total_lesson_score = 0, updated_at = NOW()
         WHERE id = $1
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}
