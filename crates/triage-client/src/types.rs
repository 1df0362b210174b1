use serde::{Deserialize, Serialize};
use triage_core::{StudentId, TaskId};

// ─── Envelope ─────────────────────────────────────────────────────────────

/// Standard API response wrapper.
///
/// ```json
/// { "success": true, "data": [ ... ], "message": "Overdue submissions retrieved" }
/// ```
///
/// Error bodies sometimes carry `error` instead of `message`; both are read.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Whether a decoded JSON body has the envelope shape rather than being a
/// bare payload.
pub fn is_envelope(body: &serde_json::Value) -> bool {
    body.as_object().is_some_and(|obj| {
        ["success", "data", "message", "error"]
            .iter()
            .any(|k| obj.contains_key(*k))
    })
}

// ─── Requests ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct NotifyRequest {
    pub student_id: StudentId,
    pub task_id: TaskId,
}
