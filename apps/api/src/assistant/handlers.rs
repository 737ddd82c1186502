use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assistant::parsing::Chapter;
use crate::assistant::{self, lesson_context, SummaryKind, MAX_LESSON_TEXT_CHARS};
use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::lessons::repository as lessons;
use crate::llm_client::prompts::TUNA_SYSTEM;
use crate::llm_client::{ChatMessage, SamplingOptions};
use crate::models::lesson::Lesson;
use crate::state::AppState;
use crate::storage::extract::{extract_text, truncate_chars};

const CHAT_HISTORY_WINDOW: usize = 10;
const CHAT_OPTIONS: SamplingOptions = SamplingOptions::new(0.7, 1000).with_top_p(0.9);
const CATEGORY_PREVIEW_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    #[serde(default)]
    pub summary_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub summary_type: SummaryKind,
    pub original_length: usize,
    pub summary_length: usize,
}

#[derive(Debug, Deserialize)]
pub struct LessonRequest {
    pub lesson_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LessonSummaryResponse {
    pub lesson_id: i64,
    pub lesson_title: String,
    pub summary: String,
    pub key_points: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ChapterizedSummaryResponse {
    pub lesson_id: i64,
    pub lesson_title: String,
    pub summary: String,
    pub chapter_count: usize,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestJobsRequest {
    pub lesson_title: String,
    #[serde(default)]
    pub lesson_description: String,
    #[serde(default)]
    pub lesson_category: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestJobsResponse {
    pub suggested_job_positions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestCategoryRequest {
    pub lesson_title: String,
    #[serde(default)]
    pub lesson_description: String,
    #[serde(default)]
    pub lesson_content: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestCategoryResponse {
    pub suggested_category: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub model: String,
    pub model_available: bool,
    pub message: String,
}

async fn find_lesson(state: &AppState, id: i64) -> Result<Lesson, AppError> {
    lessons::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lesson {id} not found")))
}

/// Text of the lesson's attached file, truncated. Missing or unreadable
/// files are logged and skipped.
pub(crate) async fn lesson_file_text(state: &AppState, lesson: &Lesson) -> Option<String> {
    let filename = lesson.filename.as_deref().filter(|f| !f.trim().is_empty())?;
    let bytes = match state.files.retrieve(filename).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Lesson {} file '{filename}' unavailable: {e}", lesson.id);
            return None;
        }
    };
    match extract_text(filename, bytes).await {
        Ok(text) => Some(truncate_chars(&text, MAX_LESSON_TEXT_CHARS).to_string()),
        Err(e) => {
            warn!("Could not extract text from '{filename}': {e}");
            None
        }
    }
}

/// POST /api/v1/ai/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let history = &req.conversation_history;
    let recent = &history[history.len().saturating_sub(CHAT_HISTORY_WINDOW)..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(ChatMessage::system(TUNA_SYSTEM));
    messages.extend(recent.iter().cloned());
    messages.push(ChatMessage::user(req.message));

    let response = state.llm.chat(&messages, CHAT_OPTIONS).await?;
    Ok(Json(ChatResponse { response }))
}

/// POST /api/v1/ai/summarize
pub async fn handle_summarize(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let kind = req
        .summary_type
        .as_deref()
        .map(SummaryKind::parse)
        .unwrap_or_default();

    let summary = assistant::summarize(&state.llm, &req.text, kind).await?;
    Ok(Json(SummarizeResponse {
        original_length: req.text.chars().count(),
        summary_length: summary.chars().count(),
        summary_type: kind,
        summary,
    }))
}

/// POST /api/v1/ai/summarize-lesson
pub async fn handle_summarize_lesson(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<LessonRequest>,
) -> Result<Json<LessonSummaryResponse>, AppError> {
    let lesson = find_lesson(&state, req.lesson_id).await?;
    let file_text = lesson_file_text(&state, &lesson).await;
    let context = lesson_context(&lesson, file_text.as_deref());

    let (summary, key_points) =
        assistant::summarize_lesson(&state.llm, &lesson.title, &context).await?;
    Ok(Json(LessonSummaryResponse {
        lesson_id: lesson.id,
        lesson_title: lesson.title,
        summary,
        key_points,
    }))
}

/// POST /api/v1/ai/chapterized-summary
pub async fn handle_chapterized_summary(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<LessonRequest>,
) -> Result<Json<ChapterizedSummaryResponse>, AppError> {
    let lesson = find_lesson(&state, req.lesson_id).await?;
    let file_text = lesson_file_text(&state, &lesson).await;
    let context = lesson_context(&lesson, file_text.as_deref());

    let (summary, chapters) =
        assistant::chapterized_summary(&state.llm, &lesson.title, &context).await?;
    Ok(Json(ChapterizedSummaryResponse {
        lesson_id: lesson.id,
        lesson_title: lesson.title,
        summary,
        chapter_count: chapters.len(),
        chapters,
    }))
}

/// POST /api/v1/ai/suggest-jobs
pub async fn handle_suggest_jobs(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<SuggestJobsRequest>,
) -> Result<Json<SuggestJobsResponse>, AppError> {
    if req.lesson_title.trim().is_empty() {
        return Err(AppError::Validation("lesson_title cannot be empty".to_string()));
    }
    let suggested_job_positions = assistant::suggest_positions(
        &state.llm,
        &req.lesson_title,
        &req.lesson_description,
        &req.lesson_category,
    )
    .await?;
    Ok(Json(SuggestJobsResponse {
        suggested_job_positions,
    }))
}

/// POST /api/v1/ai/suggest-category
pub async fn handle_suggest_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<SuggestCategoryRequest>,
) -> Result<Json<SuggestCategoryResponse>, AppError> {
    if req.lesson_title.trim().is_empty() {
        return Err(AppError::Validation("lesson_title cannot be empty".to_string()));
    }
    let preview = truncate_chars(&req.lesson_content, CATEGORY_PREVIEW_CHARS);
    let suggested_category = assistant::suggest_category(
        &state.llm,
        &req.lesson_title,
        &req.lesson_description,
        preview,
    )
    .await?;
    Ok(Json(SuggestCategoryResponse { suggested_category }))
}

/// GET /api/v1/ai/status
///
/// Never fails: an unreachable server reports `offline`.
pub async fn handle_status(State(state): State<AppState>, _auth: AuthUser) -> Json<StatusResponse> {
    let model = state.llm.model().to_string();
    let response = match state.llm.is_model_available().await {
        Ok(true) => StatusResponse {
            status: "online",
            model,
            model_available: true,
            message: "Tuna is ready to help!".to_string(),
        },
        Ok(false) => StatusResponse {
            status: "model_not_available",
            model,
            model_available: false,
            message: "Model needs to be downloaded".to_string(),
        },
        Err(e) => {
            warn!("AI status check failed: {e}");
            StatusResponse {
                status: "offline",
                model,
                model_available: false,
                message: "AI service is currently unavailable".to_string(),
            }
        }
    };
    Json(response)
}

/// POST /api/v1/ai/setup-model
pub async fn handle_setup_model(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<StatusResponse>, AppError> {
    let model = state.llm.model().to_string();
    if state.llm.is_model_available().await? {
        return Ok(Json(StatusResponse {
            status: "online",
            message: format!("Model {model} is already available"),
            model,
            model_available: true,
        }));
    }

    state.llm.pull_model().await?;
    Ok(Json(StatusResponse {
        status: "online",
        message: format!("Model {model} has been downloaded successfully"),
        model,
        model_available: true,
    }))
}
