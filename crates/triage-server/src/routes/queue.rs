use axum::extract::State;
use axum::Json;
use triage_core::types::QueueSummary;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/summary — counts and the loading flag.
pub async fn get_summary(State(app): State<AppState>) -> Json<QueueSummary> {
    Json(app.queue.summary())
}

#[derive(serde::Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub term: String,
}

/// PUT /api/search — replace the stored search term.
pub async fn put_search(
    State(app): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Json<QueueSummary> {
    app.queue.search(body.term);
    Json(app.queue.summary())
}

/// POST /api/reload — fetch a fresh snapshot.
///
/// On failure the previous snapshot stays in place and the upstream message
/// is returned.
pub async fn reload(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let count = app.queue.reload().await?;
    Ok(Json(serde_json::json!({ "count": count })))
}
