//! AI gateway: prompt assembly and reply post-processing on top of
//! [`LlmClient`]. Handlers and the lesson auto-tagger call these functions;
//! none of them touch the inference server directly.

use serde::Serialize;

use crate::llm_client::prompts::{LESSON_SYSTEM, SUMMARY_SYSTEM, TERSE_SYSTEM};
use crate::llm_client::{LlmClient, LlmError, SamplingOptions};
use crate::models::lesson::Lesson;

pub mod handlers;
pub mod parsing;
pub mod prompts;

use parsing::{Chapter, MAX_SUGGESTED_POSITIONS};

const SUMMARY_OPTIONS: SamplingOptions = SamplingOptions::new(0.3, 800);
const LESSON_OPTIONS: SamplingOptions = SamplingOptions::new(0.4, 1200);
const CHAPTER_OPTIONS: SamplingOptions = SamplingOptions::new(0.4, 1500);
const SUGGEST_OPTIONS: SamplingOptions = SamplingOptions::new(0.2, 200);

/// File text included in lesson prompts is cut to this many characters.
pub const MAX_LESSON_TEXT_CHARS: usize = 6000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    #[default]
    General,
    KeyPoints,
    Brief,
}

impl SummaryKind {
    /// Unknown values fall back to `General`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "key_points" => SummaryKind::KeyPoints,
            "brief" => SummaryKind::Brief,
            _ => SummaryKind::General,
        }
    }

    fn template(self) -> &'static str {
        match self {
            SummaryKind::General => prompts::SUMMARY_GENERAL_TEMPLATE,
            SummaryKind::KeyPoints => prompts::SUMMARY_KEY_POINTS_TEMPLATE,
            SummaryKind::Brief => prompts::SUMMARY_BRIEF_TEMPLATE,
        }
    }
}

/// Describes a lesson for the model, optionally followed by its file text.
pub fn lesson_context(lesson: &Lesson, file_text: Option<&str>) -> String {
    let duration = lesson
        .duration_minutes
        .map(|m| format!("{m} minutes"))
        .unwrap_or_else(|| "Not specified".to_string());
    let mut context = format!(
        "Title: {}\nCategory: {}\nDifficulty: {}\nDescription: {}\nDuration: {}",
        lesson.title,
        lesson.category,
        lesson.difficulty_level.as_str(),
        lesson.description.as_deref().unwrap_or("No description available"),
        duration,
    );
    if let Some(summary) = lesson.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        context.push_str(&format!("\nExisting summary: {summary}"));
    }
    match file_text.filter(|t| !t.trim().is_empty()) {
        Some(text) => context.push_str(&format!("\n\nLesson material:\n{text}")),
        None => context.push_str("\n\n[No lesson material file is attached]"),
    }
    context
}

pub async fn summarize(llm: &LlmClient, text: &str, kind: SummaryKind) -> Result<String, LlmError> {
    let prompt = kind.template().replace("{text}", text);
    llm.complete(SUMMARY_SYSTEM, &prompt, SUMMARY_OPTIONS).await
}

/// Returns the full reply and the key points parsed from it.
pub async fn summarize_lesson(
    llm: &LlmClient,
    title: &str,
    context: &str,
) -> Result<(String, Vec<String>), LlmError> {
    let prompt = prompts::LESSON_SUMMARY_TEMPLATE
        .replace("{title}", title)
        .replace("{content}", context);
    let reply = llm.complete(LESSON_SYSTEM, &prompt, LESSON_OPTIONS).await?;
    let key_points = parsing::extract_key_points(&reply);
    Ok((reply, key_points))
}

pub async fn chapterized_summary(
    llm: &LlmClient,
    title: &str,
    context: &str,
) -> Result<(String, Vec<Chapter>), LlmError> {
    let prompt = prompts::CHAPTERIZED_SUMMARY_TEMPLATE
        .replace("{title}", title)
        .replace("{content}", context);
    let reply = llm.complete(LESSON_SYSTEM, &prompt, CHAPTER_OPTIONS).await?;
    let chapters = parsing::parse_chapters(&reply);
    Ok((reply, chapters))
}

/// Job titles a lesson prepares for. Only the strings are returned; turning
/// them into related jobs is the resolver's business.
pub async fn suggest_positions(
    llm: &LlmClient,
    title: &str,
    description: &str,
    category: &str,
) -> Result<Vec<String>, LlmError> {
    let prompt = prompts::SUGGEST_POSITIONS_TEMPLATE
        .replace("{max}", &MAX_SUGGESTED_POSITIONS.to_string())
        .replace("{title}", title)
        .replace("{description}", description)
        .replace("{category}", category);
    let reply = llm.complete(TERSE_SYSTEM, &prompt, SUGGEST_OPTIONS).await?;
    Ok(parsing::parse_position_list(&reply))
}

pub async fn suggest_category(
    llm: &LlmClient,
    title: &str,
    description: &str,
    content_preview: &str,
) -> Result<String, LlmError> {
    let prompt = prompts::SUGGEST_CATEGORY_TEMPLATE
        .replace("{title}", title)
        .replace("{description}", description)
        .replace("{content}", content_preview);
    let reply = llm.complete(TERSE_SYSTEM, &prompt, SUGGEST_OPTIONS).await?;
    Ok(parsing::clean_category(&reply))
}
