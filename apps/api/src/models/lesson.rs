use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::related_job::RelatedJobSummary;

/// Difficulty tier, stored as the `difficulty_level` Postgres enum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "difficulty_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub category: String,
    pub filename: Option<String>,
    pub duration_minutes: Option<i32>,
    pub difficulty_level: Difficulty,
    /// Points awarded on completion. `None` means the default award applies.
    pub lesson_score: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonResponse {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub related_jobs: Vec<RelatedJobSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLesson {
    pub title: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub category: String,
    pub filename: Option<String>,
    pub duration_minutes: Option<i32>,
    pub difficulty_level: Option<Difficulty>,
    pub lesson_score: Option<i32>,
    pub related_job_ids: Option<Vec<i64>>,
    pub related_job_positions: Option<Vec<String>>,
}

/// Partial update. A missing field (or `null`) leaves the column unchanged.
///
/// `related_job_ids` / `related_job_positions`: omit both to keep the current
/// associations; send either (even as `[]`) to replace them wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLesson {
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub category: Option<String>,
    pub filename: Option<String>,
    pub duration_minutes: Option<i32>,
    pub difficulty_level: Option<Difficulty>,
    pub lesson_score: Option<i32>,
    pub related_job_ids: Option<Vec<i64>>,
    pub related_job_positions: Option<Vec<String>>,
}
