//! Axum route handlers for the Analysis API.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::comparator::ComparisonResult;
use crate::analysis::decoder::DocumentFormat;
use crate::analysis::AnalysisError;
use crate::errors::AppError;
use crate::state::AppState;

/// Multipart field the UI uploads the resume under.
const FILE_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ParseResumeResponse {
    pub text: String,
    pub keywords: Vec<String>,
    /// Link to the stored original. Storage lives outside this service, so it
    /// is never set here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub resume_keywords: Vec<String>,
    pub job_description: String,
}

/// A single uploaded file pulled out of the multipart body.
struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /parse-resume
///
/// Decodes an uploaded PDF or DOCX and returns its full text and keywords.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ParseResumeResponse>, AppError> {
    let mut multipart = multipart
        .map_err(|e| AppError::invalid_input(format!("Expected a multipart upload: {e}")))?;
    let upload = read_upload(&mut multipart).await?;
    let format = resolve_format(upload.content_type.as_deref(), upload.file_name.as_deref())?;

    info!(
        file_name = upload.file_name.as_deref().unwrap_or("<unnamed>"),
        ?format,
        bytes = upload.bytes.len(),
        "Parsing uploaded resume"
    );

    // Decoding is CPU-bound; keep it off the async executor.
    let analysis = Arc::clone(&state.analysis);
    let result = tokio::task::spawn_blocking(move || {
        analysis.extract_from_document(&upload.bytes, format.mime())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Extraction worker failed: {e}")))??;

    Ok(Json(ParseResumeResponse {
        text: result.text.clone(),
        keywords: result.keywords.clone(),
        resume_url: None,
    }))
}

/// POST /compare
///
/// Partitions the job description's keywords into matches and missing.
pub async fn handle_compare(
    State(state): State<AppState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Result<Json<ComparisonResult>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::invalid_input(e.body_text()))?;
    let result = state
        .analysis
        .compare(&request.resume_keywords, &request.job_description)?;
    Ok(Json(result))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Returns the `file` field, or the first field carrying a file name.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_input(format!("Unreadable multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) && field.file_name().is_none() {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::invalid_input(format!("Upload could not be read: {e}")))?;
        return Ok(Upload {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(AppError::invalid_input("No file uploaded"))
}

/// The declared content type wins. Browsers send `application/octet-stream`
/// (or nothing) for unknown types, so then the file extension decides.
fn resolve_format(
    content_type: Option<&str>,
    file_name: Option<&str>,
) -> Result<DocumentFormat, AnalysisError> {
    match content_type {
        Some(ct) if !is_generic_content_type(ct) => DocumentFormat::from_mime(ct),
        _ => file_name
            .and_then(DocumentFormat::from_file_name)
            .ok_or_else(|| {
                AnalysisError::UnsupportedFormat(format!(
                    "cannot tell the format of '{}'; upload a PDF or DOCX file",
                    file_name.unwrap_or("upload")
                ))
            }),
    }
}

fn is_generic_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .eq_ignore_ascii_case("application/octet-stream")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_content_type_wins() {
        assert_eq!(
            resolve_format(Some("application/pdf"), Some("cv.docx")),
            Ok(DocumentFormat::Pdf)
        );
        assert!(matches!(
            resolve_format(Some("text/plain"), Some("cv.pdf")),
            Err(AnalysisError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_generic_content_type_falls_back_to_extension() {
        assert_eq!(
            resolve_format(Some("application/octet-stream"), Some("cv.docx")),
            Ok(DocumentFormat::Docx)
        );
        assert_eq!(resolve_format(None, Some("cv.pdf")), Ok(DocumentFormat::Pdf));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        assert!(matches!(
            resolve_format(None, Some("cv.odt")),
            Err(AnalysisError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            resolve_format(None, None),
            Err(AnalysisError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_compare_request_defaults_resume_keywords() {
        let request: CompareRequest =
            serde_json::from_str(r#"{"job_description": "Rust"}"#).unwrap();
        assert!(request.resume_keywords.is_empty());
    }

    #[test]
    fn test_parse_response_omits_missing_resume_url() {
        let body = serde_json::to_value(ParseResumeResponse {
            text: "Rust".to_string(),
            keywords: vec!["Rust".to_string()],
            resume_url: None,
        })
        .unwrap();
        assert!(body.get("resume_url").is_none());
        assert_eq!(body["keywords"][0], "Rust");
    }
}
