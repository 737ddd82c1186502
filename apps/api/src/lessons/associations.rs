//! Lesson Association Manager: rewrites a lesson's related-job set.
//!
//! Associations are replaced wholesale, never merged: an update naming only
//! new positions drops every previously linked job it does not mention.
//! Callers that want to *add* jobs must pass the existing ids along.

use std::collections::HashSet;

use sqlx::PgConnection;
use tracing::info;

use crate::errors::AppError;
use crate::models::related_job::RelatedJob;
use crate::related_jobs::{repository, resolver};

/// What to do with a lesson's associations on create/update.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AssociationUpdate {
    /// Neither list was supplied: keep the current set.
    #[default]
    Unchanged,
    /// Replace the set with `job_ids` ∪ resolve(`positions`).
    /// Both empty clears every association.
    Replace {
        job_ids: Vec<i64>,
        positions: Vec<String>,
    },
}

impl AssociationUpdate {
    /// Builds the update from request payload fields: absent lists mean
    /// "leave alone" only when *both* are absent.
    pub fn from_payload(job_ids: Option<Vec<i64>>, positions: Option<Vec<String>>) -> Self {
        match (job_ids, positions) {
            (None, None) => AssociationUpdate::Unchanged,
            (job_ids, positions) => AssociationUpdate::Replace {
                job_ids: job_ids.unwrap_or_default(),
                positions: positions.unwrap_or_default(),
            },
        }
    }

    pub fn clear_all() -> Self {
        AssociationUpdate::Replace {
            job_ids: Vec::new(),
            positions: Vec::new(),
        }
    }
}

/// Concatenates the two candidate sets and drops repeated ids, keeping the
/// first occurrence.
pub fn merge_unique(explicit: Vec<RelatedJob>, resolved: Vec<RelatedJob>) -> Vec<RelatedJob> {
    let mut seen = HashSet::new();
    explicit
        .into_iter()
        .chain(resolved)
        .filter(|job| seen.insert(job.id))
        .collect()
}

/// Applies `update` to the lesson's association rows.
///
/// Must run inside the caller's transaction: positions may create new
/// related jobs, and those must not outlive a failed lesson write.
/// Returns the new set, or `None` when the update was `Unchanged`.
pub async fn sync_associations(
    conn: &mut PgConnection,
    lesson_id: i64,
    update: &AssociationUpdate,
) -> Result<Option<Vec<RelatedJob>>, AppError> {
    let (job_ids, positions) = match update {
        AssociationUpdate::Unchanged => return Ok(None),
        AssociationUpdate::Replace { job_ids, positions } => (job_ids, positions),
    };

    let explicit = repository::find_many(conn, job_ids).await?;

    let mut resolved = Vec::new();
    for position in positions.iter().filter(|p| !p.trim().is_empty()) {
        resolved.push(resolver::resolve(conn, position, None).await?);
    }

    let jobs = merge_unique(explicit, resolved);
    let ids: Vec<i64> = jobs.iter().map(|j| j.id).collect();

    sqlx::query("DELETE FROM lesson_related_jobs WHERE lesson_id = $1")
        .bind(lesson_id)
        .execute(&mut *conn)
        .await?;

    if !ids.is_empty() {
        sqlx::query(
            "INSERT INTO lesson_related_jobs (lesson_id, related_job_id)
             SELECT $1, UNNEST($2::bigint[])",
        )
        .bind(lesson_id)
        .bind(&ids)
        .execute(&mut *conn)
        .await?;
    }

    info!(
        "Lesson {lesson_id} now linked to {} related job(s): {:?}",
        ids.len(),
        ids
    );
    Ok(Some(jobs))
}

/// Current related jobs of a lesson, ordered by id.
pub async fn related_jobs_for_lesson(
    conn: &mut PgConnection,
    lesson_id: i64,
) -> Result<Vec<RelatedJob>, sqlx::Error> {
    sqlx::query_as::<_, RelatedJob>(
        "SELECT rj.id, rj.position, rj.company, rj.description, rj.job_type,
                rj.experience_level, rj.industry, rj.skills_required, rj.is_active,
                rj.created_at, rj.updated_at
         FROM related_jobs rj
         JOIN lesson_related_jobs lrj ON lrj.related_job_id = rj.id
         WHERE lrj.lesson_id = $1
         ORDER BY rj.id",
    )
    .bind(lesson_id)
    .fetch_all(&mut *conn)
    .await
}
