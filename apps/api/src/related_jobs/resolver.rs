//! Related-Job Resolver: find-or-create a `RelatedJob` from free text.
//!
//! Matching is a case-insensitive *substring* match on position (and on
//! company when one is given): "Engineer" resolves to an existing
//! "Software Engineer". Lexical variants that do not contain each other
//! ("Data Analyst" vs "Analyst, Data") are not merged and produce separate
//! rows. The first match in ascending id order wins.
//!
//! The lookup and the insert are not serialized and the table has no
//! uniqueness on position, so two concurrent resolves of a position that
//! does not exist yet may both insert. Later resolves then pick the lower id.

use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use crate::db::contains_pattern;
use crate::errors::AppError;
use crate::models::related_job::RelatedJob;
use crate::related_jobs::repository::COLUMNS;

/// Normalized resolver input. Position is required; a blank company is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionQuery<'a> {
    pub position: &'a str,
    pub company: Option<&'a str>,
}

impl<'a> PositionQuery<'a> {
    pub fn parse(position: &'a str, company: Option<&'a str>) -> Result<Self, AppError> {
        let position = position.trim();
        if position.is_empty() {
            return Err(AppError::Validation(
                "Job position cannot be empty".to_string(),
            ));
        }
        let company = company.map(str::trim).filter(|c| !c.is_empty());
        Ok(Self { position, company })
    }
}

/// Returns the first existing job matching `position` (and `company`), or
/// inserts a new active one.
///
/// Runs on the caller's connection so it joins the caller's transaction.
pub async fn resolve(
    conn: &mut PgConnection,
    position: &str,
    company: Option<&str>,
) -> Result<RelatedJob, AppError> {
    let query = PositionQuery::parse(position, company)?;

    if let Some(existing) = find_first_match(conn, &query).await? {
        debug!(
            "Resolved position '{}' to related job {} ('{}')",
            query.position, existing.id, existing.position
        );
        return Ok(existing);
    }

    let sql = format!(
        "INSERT INTO related_jobs (position, company, is_active)
         VALUES ($1, $2, TRUE)
         RETURNING {COLUMNS}"
    );
    let created = sqlx::query_as::<_, RelatedJob>(&sql)
        .bind(query.position)
        .bind(query.company)
        .fetch_one(&mut *conn)
        .await?;

    info!(
        "Created related job {} for position '{}'",
        created.id, created.position
    );
    Ok(created)
}

async fn find_first_match(
    conn: &mut PgConnection,
    query: &PositionQuery<'_>,
) -> Result<Option<RelatedJob>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM related_jobs
         WHERE position ILIKE $1
           AND ($2::text IS NULL OR company ILIKE $2)
         ORDER BY id
         LIMIT 1"
    );
    sqlx::query_as::<_, RelatedJob>(&sql)
        .bind(contains_pattern(query.position))
        .bind(query.company.map(contains_pattern))
        .fetch_optional(&mut *conn)
        .await
}

/// Lists every active job the resolver could match for `position`, without
/// creating anything. Shortest positions first.
pub async fn suggest_matches(
    pool: &PgPool,
    position: &str,
    limit: i64,
) -> Result<Vec<RelatedJob>, AppError> {
    let query = PositionQuery::parse(position, None)?;
    let sql = format!(
        "SELECT {COLUMNS} FROM related_jobs
         WHERE is_active AND position ILIKE $1
         ORDER BY LENGTH(position), id
         LIMIT $2"
    );
    Ok(sqlx::query_as::<_, RelatedJob>(&sql)
        .bind(contains_pattern(query.position))
        .bind(limit)
        .fetch_all(pool)
        .await?)
}
