use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A job-position record used to tag lessons with career paths.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct RelatedJob {
    pub id: i64,
    pub position: String,
    pub company: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub industry: Option<String>,
    pub skills_required: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Compact form embedded in lesson responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelatedJobSummary {
    pub id: i64,
    pub position: String,
    pub company: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
}

impl From<&RelatedJob> for RelatedJobSummary {
    fn from(job: &RelatedJob) -> Self {
        Self {
            id: job.id,
            position: job.position.clone(),
            company: job.company.clone(),
            job_type: job.job_type.clone(),
            experience_level: job.experience_level.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRelatedJob {
    pub position: String,
    pub company: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub industry: Option<String>,
    pub skills_required: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRelatedJob {
    pub position: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub industry: Option<String>,
    pub skills_required: Option<String>,
    pub is_active: Option<bool>,
}
