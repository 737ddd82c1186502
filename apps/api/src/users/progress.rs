//! Completion tracker: turns a finished lesson into points on the user's counters.
//!
//! There is no per-user completion ledger, so completing the same lesson
//! twice counts twice.

use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;

/// Points awarded when a lesson has no `lesson_score`.
pub const DEFAULT_LESSON_POINTS: i64 = 10;

pub fn points_for(lesson_score: Option<i32>) -> i64 {
    lesson_score.map(i64::from).unwrap_or(DEFAULT_LESSON_POINTS)
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionReceipt {
    pub lesson_id: i64,
    pub lesson_title: String,
    pub points_earned: i64,
    pub total_lessons_completed: i64,
    pub total_score: i64,
    pub message: String,
}

/// Increments the user's completion count and score in one transaction.
pub async fn complete_lesson(
    pool: &PgPool,
    user_id: i64,
    lesson_id: i64,
) -> Result<CompletionReceipt, AppError> {
    let mut tx = pool.begin().await?;

    let (lesson_title, lesson_score): (String, Option<i32>) =
        sqlx::query_as("SELECT title, lesson_score FROM lessons WHERE id = $1")
            .bind(lesson_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lesson {lesson_id} not found")))?;

    let points = points_for(lesson_score);

    // Single UPDATE so concurrent completions serialize on the row lock.
    let (total_lessons_completed, total_score): (i64, i64) = sqlx::query_as(
        "UPDATE users SET
            lessons_completed = lessons_completed + 1,
            total_lesson_score = total_lesson_score + $2,
            updated_at = NOW()
         WHERE id = $1
         RETURNING lessons_completed, total_lesson_score",
    )
    .bind(user_id)
    .bind(points)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    tx.commit().await?;

    info!(
        "User {user_id} completed lesson {lesson_id} (+{points} points, total {total_score})"
    );

    Ok(CompletionReceipt {
        lesson_id,
        message: format!("Successfully completed '{lesson_title}' and earned {points} points!"),
        lesson_title,
        points_earned: points,
        total_lessons_completed,
        total_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_score_awards_default() {
        assert_eq!(points_for(None), 10);
    }

    #[test]
    fn test_explicit_score_awarded() {
        assert_eq!(points_for(Some(25)), 25);
        assert_eq!(points_for(Some(0)), 0);
    }
}
