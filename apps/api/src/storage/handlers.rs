use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::MessageResponse;
use crate::state::AppState;
use crate::storage::extract::{self, extract_text};
use crate::storage::{validate_name, with_original_extension, FileInfo};

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub original_filename: Option<String>,
    pub file_size: usize,
}

#[derive(Debug, Serialize)]
pub struct ExtractedText {
    pub filename: String,
    pub text: String,
    pub characters: usize,
}

/// POST /api/v1/files?filename=
///
/// Multipart body with a `file` field.
pub async fn handle_upload(
    State(state): State<AppState>,
    Query(params): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original_filename = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        let desired = with_original_extension(params.filename.trim(), original_filename.as_deref());
        validate_name(&desired)?;
        let filename = state.files.store(&bytes, &desired).await?;
        info!("Uploaded {} ({} bytes)", filename, bytes.len());

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                message: "File uploaded successfully".to_string(),
                filename,
                original_filename,
                file_size: bytes.len(),
            }),
        ));
    }

    Err(AppError::Validation(
        "Multipart body must contain a 'file' field".to_string(),
    ))
}

/// GET /api/v1/files
pub async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<FileInfo>>, AppError> {
    Ok(Json(state.files.list().await?))
}

/// GET /api/v1/files/:filename
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let bytes = state.files.retrieve(&filename).await?;
    let content_type = match extract::extension_of(&filename).as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        _ => "application/octet-stream",
    };
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{filename}\""),
            ),
        ],
        Body::from(bytes),
    )
        .into_response())
}

/// DELETE /api/v1/files/:filename
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.files.delete(&filename).await?;
    Ok(Json(MessageResponse::new(format!(
        "File '{filename}' deleted successfully"
    ))))
}

/// GET /api/v1/files/:filename/text
pub async fn handle_extract(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<ExtractedText>, AppError> {
    let bytes = state.files.retrieve(&filename).await?;
    let text = extract_text(&filename, bytes).await?;
    Ok(Json(ExtractedText {
        characters: text.chars().count(),
        filename,
        text,
    }))
}
