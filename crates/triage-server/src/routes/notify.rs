use axum::extract::State;
use axum::Json;
use triage_core::{StudentId, TaskId};

use crate::error::AppError;
use crate::routes::outcome_result;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct NotifyBody {
    pub student_id: StudentId,
    pub task_id: TaskId,
}

/// POST /api/notify — send an overdue reminder to one student.
pub async fn notify(
    State(app): State<AppState>,
    Json(body): Json<NotifyBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    outcome_result(app.queue.notify(body.student_id, body.task_id).await)?;
    Ok(Json(serde_json::json!({
        "status": "completed",
        "student_id": body.student_id,
        "task_id": body.task_id,
    })))
}
