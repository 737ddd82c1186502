use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full row from the `users` table. Carries the password hash, so it is
/// never serialized directly; handlers return [`UserResponse`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub lessons_completed: i64,
    pub total_lesson_score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub lessons_completed: i64,
    pub total_lesson_score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            is_active: user.is_active,
            lessons_completed: user.lessons_completed,
            total_lesson_score: user.total_lesson_score,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Input for inserting a user; the password is already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub hashed_password: String,
}

/// Profile changes. Counters are not editable here; use completion or reset.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub username: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub user_id: i64,
    pub username: String,
    pub lessons_completed: i64,
    pub total_lesson_score: i64,
    pub average_score: f64,
}
