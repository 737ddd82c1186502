use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A standalone job posting. Not linked to lessons; see `RelatedJob` for tagging.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: i64,
    pub position: String,
    pub company: String,
    pub description: Option<String>,
    pub job_criteria: String,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub job_type: String,
    pub remote_option: bool,
    pub experience_level: String,
    pub is_active: bool,
    pub recruiter_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJob {
    pub position: String,
    pub company: String,
    pub description: Option<String>,
    pub job_criteria: String,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    #[serde(default = "default_job_type")]
    pub job_type: String,
    #[serde(default)]
    pub remote_option: bool,
    #[serde(default = "default_experience_level")]
    pub experience_level: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub recruiter_id: Option<i64>,
}

fn default_job_type() -> String {
    "full-time".to_string()
}

fn default_experience_level() -> String {
    "entry".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJob {
    pub position: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub job_criteria: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub job_type: Option<String>,
    pub remote_option: Option<bool>,
    pub experience_level: Option<String>,
    pub is_active: Option<bool>,
    pub recruiter_id: Option<i64>,
}

/// Filters shared by the job list and count endpoints.
/// `company` and `location` are substring matches; the rest are exact.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub remote_option: Option<bool>,
    pub is_active: Option<bool>,
    pub recruiter_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobStatistics {
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub remote_jobs: i64,
    pub job_types: BTreeMap<String, i64>,
    pub experience_levels: BTreeMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_job_defaults() {
        let job: CreateJob = serde_json::from_str(
            r#"{"position": "Backend Engineer", "company": "Acme", "job_criteria": "Rust"}"#,
        )
        .unwrap();
        assert_eq!(job.job_type, "full-time");
        assert_eq!(job.experience_level, "entry");
        assert!(!job.remote_option);
        assert!(job.is_active);
        assert!(job.recruiter_id.is_none());
    }
}
