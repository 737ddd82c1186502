//! Plain-text extraction from stored lesson files.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "md"];

/// Lowercased extension without the dot.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

/// UTF-8 with replacement characters for invalid sequences.
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

/// Returns at most `max_chars` characters, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Extracts text according to the extension of `name`.
pub async fn extract_text(name: &str, bytes: Vec<u8>) -> Result<String, ExtractError> {
    let ext = extension_of(name).unwrap_or_default();
    match ext.as_str() {
        "pdf" => {
            // pdf-extract is synchronous and may panic on malformed input.
            let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
                .map_err(|e| ExtractError::Pdf(format!("extraction task failed: {e}")))?
                .map_err(|e| ExtractError::Pdf(format!("{e:?}")))?;
            Ok(text.trim().to_string())
        }
        "txt" | "md" => Ok(decode_text(&bytes)),
        _ => Err(ExtractError::Unsupported(if ext.is_empty() {
            name.to_string()
        } else {
            format!(".{ext}")
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("Notes.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension_of("README"), None);
    }

    #[test]
    fn test_decode_text_is_lossy() {
        assert_eq!(decode_text(b"  caf\xc3\xa9 \n"), "café");
        assert_eq!(decode_text(b"ok\xff"), "ok\u{fffd}");
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[tokio::test]
    async fn test_markdown_extracted() {
        let text = extract_text("week1.md", b"# Intro\nBody".to_vec()).await.unwrap();
        assert_eq!(text, "# Intro\nBody");
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let err = extract_text("slides.pptx", vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, ExtractError::Unsupported(ext) if ext == ".pptx"));
    }
}
