//! Pure ranking math. Everything here works on rows already fetched by
//! [`super::repository`], so it can be tested without a database.

use serde::Serialize;
use sqlx::FromRow;

pub const DEFAULT_GLOBAL_LIMIT: i64 = 10;
pub const MAX_GLOBAL_LIMIT: i64 = 50;
pub const DEFAULT_PER_JOB_LIMIT: i64 = 5;
pub const MAX_PER_JOB_LIMIT: i64 = 20;

/// Share of a user's total score credited to their best job.
pub const BEST_JOB_SCORE_RATIO: f64 = 0.7;
/// Share of a user's completions assumed to belong to their best job.
pub const BEST_JOB_LESSON_RATIO: f64 = 0.6;

/// A user row as returned by the global ranking query, already ordered.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RankedUser {
    pub user_id: i64,
    pub username: String,
    pub lessons_completed: i64,
    pub total_score: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: i64,
    pub username: String,
    pub lessons_completed: i64,
    pub total_score: i64,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobPerformer {
    pub rank: usize,
    pub user_id: i64,
    pub username: String,
    pub lessons_completed: i64,
    pub total_score: i64,
    pub estimated_job_score: f64,
}

pub fn clamp_global_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_GLOBAL_LIMIT).clamp(1, MAX_GLOBAL_LIMIT)
}

pub fn clamp_per_job_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PER_JOB_LIMIT).clamp(1, MAX_PER_JOB_LIMIT)
}

/// `total / completed`, or 0 for a user with no completions.
pub fn average_score(total_score: i64, lessons_completed: i64) -> f64 {
    if lessons_completed <= 0 {
        return 0.0;
    }
    total_score as f64 / lessons_completed as f64
}

/// `total × (job_lessons / max(completed, 1))`.
pub fn estimated_job_score(total_score: i64, job_lesson_count: i64, lessons_completed: i64) -> f64 {
    total_score as f64 * (job_lesson_count as f64 / lessons_completed.max(1) as f64)
}

/// `(estimated_job_score, estimated_completed_lessons)` for a user's best job.
pub fn best_job_estimates(total_score: i64, lessons_completed: i64) -> (f64, i64) {
    let score = BEST_JOB_SCORE_RATIO * total_score as f64;
    let completed = ((BEST_JOB_LESSON_RATIO * lessons_completed as f64).floor() as i64).max(1);
    (score, completed)
}

/// Assigns 1-based ranks in input order.
pub fn rank(users: Vec<RankedUser>) -> Vec<LeaderboardEntry> {
    users
        .into_iter()
        .enumerate()
        .map(|(i, u)| LeaderboardEntry {
            rank: i + 1,
            average_score: average_score(u.total_score, u.lessons_completed),
            user_id: u.user_id,
            username: u.username,
            lessons_completed: u.lessons_completed,
            total_score: u.total_score,
        })
        .collect()
}

/// Re-ranks the oversampled pool by estimated job score and keeps the top `limit`.
/// Equal estimates keep their global order.
pub fn top_performers(pool: &[RankedUser], job_lesson_count: i64, limit: usize) -> Vec<JobPerformer> {
    let mut scored: Vec<(f64, &RankedUser)> = pool
        .iter()
        .map(|u| {
            (
                estimated_job_score(u.total_score, job_lesson_count, u.lessons_completed),
                u,
            )
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (estimate, u))| JobPerformer {
            rank: i + 1,
            user_id: u.user_id,
            username: u.username.clone(),
            lessons_completed: u.lessons_completed,
            total_score: u.total_score,
            estimated_job_score: estimate,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, completed: i64, total: i64) -> RankedUser {
        RankedUser {
            user_id: id,
            username: format!("user{id}"),
            lessons_completed: completed,
            total_score: total,
        }
    }

    #[test]
    fn test_average_score() {
        assert_eq!(average_score(120, 4), 30.0);
        assert_eq!(average_score(0, 0), 0.0);
    }

    #[test]
    fn test_estimated_job_score() {
        // 3 lessons tagged with the job, user completed 10 for 120 points.
        assert_eq!(estimated_job_score(120, 3, 10), 36.0);
        // Zero completions divide by one.
        assert_eq!(estimated_job_score(50, 2, 0), 100.0);
    }

    #[test]
    fn test_best_job_estimates() {
        assert_eq!(best_job_estimates(100, 10), (70.0, 6));
        // floor(0.6) = 0 is raised to 1.
        assert_eq!(best_job_estimates(10, 1), (7.0, 1));
    }

    #[test]
    fn test_limits_are_clamped() {
        assert_eq!(clamp_global_limit(None), 10);
        assert_eq!(clamp_global_limit(Some(500)), 50);
        assert_eq!(clamp_global_limit(Some(0)), 1);
        assert_eq!(clamp_per_job_limit(None), 5);
        assert_eq!(clamp_per_job_limit(Some(100)), 20);
    }

    #[test]
    fn test_rank_assigns_positions_and_averages() {
        let ranked = rank(vec![user(7, 4, 120), user(3, 2, 40)]);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].user_id, 7);
        assert_eq!(ranked[0].average_score, 30.0);
        assert_eq!(ranked[1].rank, 2);
        assert_eq!(ranked[1].average_score, 20.0);
    }

    #[test]
    fn test_top_performers_resorts_and_truncates() {
        // Global order by total: 1, 2, 3. Estimates with 2 job lessons:
        // u1 = 100 * 2/20 = 10, u2 = 80 * 2/4 = 40, u3 = 30 * 2/1 = 60.
        let pool = vec![user(1, 20, 100), user(2, 4, 80), user(3, 1, 30)];
        let top = top_performers(&pool, 2, 2);
        let ids: Vec<i64> = top.iter().map(|p| p.user_id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[0].estimated_job_score, 60.0);
    }

    #[test]
    fn test_top_performers_ties_keep_global_order() {
        let pool = vec![user(1, 2, 20), user(2, 1, 10)];
        let top = top_performers(&pool, 1, 5);
        let ids: Vec<i64> = top.iter().map(|p| p.user_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
