pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;
use crate::{assistant, auth, jobs, leaderboard, lessons, related_jobs, storage, users};

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/register", post(auth::handlers::handle_register))
        .route("/api/v1/auth/login", post(auth::handlers::handle_login))
        .route(
            "/api/v1/auth/me",
            get(auth::handlers::handle_me).put(auth::handlers::handle_update_me),
        )
        // Users
        .route("/api/v1/users", get(users::handlers::handle_list))
        .route(
            "/api/v1/users/:id",
            get(users::handlers::handle_get)
                .put(users::handlers::handle_update)
                .delete(users::handlers::handle_delete),
        )
        .route("/api/v1/users/:id/stats", get(users::handlers::handle_stats))
        .route(
            "/api/v1/users/:id/reset-progress",
            post(users::handlers::handle_reset_progress),
        )
        .route(
            "/api/v1/users/:id/lessons/:lesson_id/complete",
            post(users::handlers::handle_complete_lesson),
        )
        // Lessons
        .route(
            "/api/v1/lessons",
            get(lessons::handlers::handle_list).post(lessons::handlers::handle_create),
        )
        .route("/api/v1/lessons/search", get(lessons::handlers::handle_search))
        .route("/api/v1/lessons/count", get(lessons::handlers::handle_count))
        .route(
            "/api/v1/lessons/category/:category",
            get(lessons::handlers::handle_by_category),
        )
        .route(
            "/api/v1/lessons/:id",
            get(lessons::handlers::handle_get)
                .put(lessons::handlers::handle_update)
                .delete(lessons::handlers::handle_delete),
        )
        .route(
            "/api/v1/lessons/:id/complete",
            post(lessons::handlers::handle_complete),
        )
        .route(
            "/api/v1/lessons/:id/related-jobs/suggest",
            post(lessons::handlers::handle_auto_tag),
        )
        // Related jobs
        .route(
            "/api/v1/related-jobs",
            get(related_jobs::handlers::handle_list).post(related_jobs::handlers::handle_create),
        )
        .route(
            "/api/v1/related-jobs/resolve",
            post(related_jobs::handlers::handle_resolve),
        )
        .route(
            "/api/v1/related-jobs/suggest",
            get(related_jobs::handlers::handle_suggest),
        )
        .route(
            "/api/v1/related-jobs/:id",
            get(related_jobs::handlers::handle_get)
                .put(related_jobs::handlers::handle_update)
                .delete(related_jobs::handlers::handle_delete),
        )
        .route(
            "/api/v1/related-jobs/:id/lessons",
            get(related_jobs::handlers::handle_lessons),
        )
        // Jobs
        .route(
            "/api/v1/jobs",
            get(jobs::handlers::handle_list).post(jobs::handlers::handle_create),
        )
        .route("/api/v1/jobs/active", get(jobs::handlers::handle_active))
        .route("/api/v1/jobs/remote", get(jobs::handlers::handle_remote))
        .route("/api/v1/jobs/search", get(jobs::handlers::handle_search))
        .route("/api/v1/jobs/count", get(jobs::handlers::handle_count))
        .route(
            "/api/v1/jobs/statistics",
            get(jobs::handlers::handle_statistics),
        )
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handlers::handle_get)
                .put(jobs::handlers::handle_update)
                .delete(jobs::handlers::handle_delete),
        )
        .route(
            "/api/v1/jobs/:id/activate",
            patch(jobs::handlers::handle_activate),
        )
        .route(
            "/api/v1/jobs/:id/deactivate",
            patch(jobs::handlers::handle_deactivate),
        )
        // Leaderboard
        .route("/api/v1/leaderboard", get(leaderboard::handlers::handle_global))
        .route(
            "/api/v1/leaderboard/by-related-job",
            get(leaderboard::handlers::handle_by_related_job),
        )
        .route(
            "/api/v1/leaderboard/users/:id/best-job",
            get(leaderboard::handlers::handle_best_job),
        )
        // AI assistant
        .route("/api/v1/ai/chat", post(assistant::handlers::handle_chat))
        .route("/api/v1/ai/summarize", post(assistant::handlers::handle_summarize))
        .route(
            "/api/v1/ai/summarize-lesson",
            post(assistant::handlers::handle_summarize_lesson),
        )
        .route(
            "/api/v1/ai/chapterized-summary",
            post(assistant::handlers::handle_chapterized_summary),
        )
        .route(
            "/api/v1/ai/suggest-jobs",
            post(assistant::handlers::handle_suggest_jobs),
        )
        .route(
            "/api/v1/ai/suggest-category",
            post(assistant::handlers::handle_suggest_category),
        )
        .route("/api/v1/ai/status", get(assistant::handlers::handle_status))
        .route(
            "/api/v1/ai/setup-model",
            post(assistant::handlers::handle_setup_model),
        )
        // Files
        .route(
            "/api/v1/files",
            get(storage::handlers::handle_list).post(storage::handlers::handle_upload),
        )
        .route(
            "/api/v1/files/:filename",
            get(storage::handlers::handle_download).delete(storage::handlers::handle_delete),
        )
        .route(
            "/api/v1/files/:filename/text",
            get(storage::handlers::handle_extract),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
