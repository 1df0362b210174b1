use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use triage_core::types::RowView;
use triage_core::{StagedFile, SubmissionId, TriageError};

use crate::error::AppError;
use crate::routes::outcome_result;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
}

/// GET /api/submissions?search=<term>
///
/// Rows matching `search` when given, otherwise the stored search term.
pub async fn list_submissions(
    State(app): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<RowView>> {
    let rows = match params.search {
        Some(term) => app.queue.rows_matching(&term),
        None => app.queue.rows(),
    };
    Json(rows)
}

#[derive(serde::Deserialize)]
pub struct StageParams {
    pub name: String,
    pub content_type: Option<String>,
}

/// PUT /api/submissions/{id}/file?name=<file name>&content_type=<mime>
///
/// The request body is the raw file. The content type comes from the query,
/// then the request header, then a guess from the file name.
pub async fn stage_file(
    State(app): State<AppState>,
    Path(id): Path<SubmissionId>,
    Query(params): Query<StageParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let name = params.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("file name is required"));
    }
    if body.is_empty() {
        return Err(AppError::bad_request(format!("'{name}' is empty")));
    }

    let mut file = StagedFile::new(name, body);
    if let Some(content_type) = content_type_for(name, params.content_type, &headers) {
        file = file.with_content_type(content_type);
    }
    let info = file.info();
    app.queue.stage_file(id, file)?;

    Ok(Json(serde_json::json!({
        "submission_id": id,
        "staged_file": info,
    })))
}

/// DELETE /api/submissions/{id}/file — discard the staged file.
pub async fn unstage_file(
    State(app): State<AppState>,
    Path(id): Path<SubmissionId>,
) -> Result<Json<serde_json::Value>, AppError> {
    let file = app
        .queue
        .unstage_file(id)
        .ok_or(TriageError::NoStagedFile(id))?;
    Ok(Json(serde_json::json!({
        "submission_id": id,
        "staged_file": file.info(),
    })))
}

/// POST /api/submissions/{id}/submit — upload the staged file on the
/// student's behalf, then reload.
pub async fn submit(
    State(app): State<AppState>,
    Path(id): Path<SubmissionId>,
) -> Result<Json<serde_json::Value>, AppError> {
    outcome_result(app.queue.submit_on_behalf(id).await)?;
    Ok(Json(serde_json::json!({
        "status": "completed",
        "submission_id": id,
    })))
}

fn content_type_for(name: &str, explicit: Option<String>, headers: &HeaderMap) -> Option<String> {
    if let Some(ct) = explicit.filter(|ct| !ct.trim().is_empty()) {
        return Some(ct);
    }
    let from_header = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream");
    if let Some(ct) = from_header {
        return Some(ct.to_string());
    }
    mime_guess::from_path(name).first().map(|m| m.to_string())
}
