//! Analysis handlers

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AppError, AppState, SuccessResponse, MAX_UPLOAD_SIZE};
use finsight_core::{demo::DEMO_CSV, AnalysisReport, CurrentReport};

/// Raw expense text to analyze
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

/// Demo data response
#[derive(Serialize)]
pub struct DemoResponse {
    pub text: &'static str,
}

/// POST /api/analyze - Analyze pasted expense text
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    let report = state.session.run(&request.text).await?;
    Ok(Json(report))
}

/// POST /api/analyze/upload - Analyze an uploaded statement
///
/// Expects a multipart form with a `file` field (CSV or plain text, max 10MB).
/// When no field is named `file`, the first field carrying a filename is used.
pub async fn analyze_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, "Failed to read form field"))?
    {
        let is_file = field.name() == Some("file") || field.file_name().is_some();
        if !is_file || file_data.is_some() {
            continue;
        }

        debug!(
            filename = field.file_name().unwrap_or("(none)"),
            "Reading uploaded statement"
        );

        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_error(e, "Failed to read file data"))?;

        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(too_large());
        }

        file_data = Some(bytes.to_vec());
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    let text = String::from_utf8(file_data)
        .map_err(|_| AppError::bad_request("Uploaded file must be UTF-8 text"))?;

    let report = state.session.run(&text).await?;
    Ok(Json(report))
}

fn too_large() -> AppError {
    AppError::payload_too_large(&format!(
        "File too large. Maximum size is {} MB",
        MAX_UPLOAD_SIZE / 1024 / 1024
    ))
}

/// Body limit hits surface as multipart read errors; keep them 413
fn upload_error(err: MultipartError, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large()
    } else {
        AppError::bad_request(&format!("{}: {}", context, err.body_text()))
    }
}

/// GET /api/report - Current report on display
pub async fn get_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CurrentReport>, AppError> {
    state
        .session
        .current()
        .map(Json)
        .ok_or_else(|| AppError::not_found("No report available"))
}

/// DELETE /api/report - Start a new analysis
pub async fn clear_report(State(state): State<Arc<AppState>>) -> Json<SuccessResponse> {
    state.session.clear();
    Json(SuccessResponse { success: true })
}

/// GET /api/demo - Bundled sample statement
pub async fn get_demo() -> Json<DemoResponse> {
    Json(DemoResponse { text: DEMO_CSV })
}
