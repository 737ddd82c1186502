// Standalone job postings. Unrelated to lesson tagging (see related_jobs).

pub mod handlers;
pub mod repository;
