//! Campus API: lessons, related-job tagging, progress points and leaderboards
//! for an educational platform, with an Ollama-backed study assistant.

pub mod assistant;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod jobs;
pub mod leaderboard;
pub mod lessons;
pub mod llm_client;
pub mod models;
pub mod related_jobs;
pub mod routes;
pub mod state;
pub mod storage;
pub mod users;
