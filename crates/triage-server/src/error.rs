use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use triage_core::{Failure, SkipReason, TriageError};

// ---------------------------------------------------------------------------
// Internal sentinels for explicit status codes
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 409 through the `anyhow::Error` chain.
#[derive(Debug)]
struct ConflictError(String);

impl std::fmt::Display for ConflictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConflictError {}

/// Carries an explicit HTTP 404 through the `anyhow::Error` chain.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    /// Construct a 409 Conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self(ConflictError(msg.into()).into())
    }

    /// Construct a 404 Not Found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }

    /// An action that was refused before any request went out.
    pub fn skipped(reason: SkipReason) -> Self {
        match reason {
            SkipReason::UnknownSubmission { .. } => Self::not_found(reason.to_string()),
            _ => Self::conflict(reason.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(c) = self.0.downcast_ref::<ConflictError>() {
            let body = serde_json::json!({ "error": c.0.clone() });
            return (StatusCode::CONFLICT, axum::Json(body)).into_response();
        }
        if let Some(n) = self.0.downcast_ref::<NotFoundError>() {
            let body = serde_json::json!({ "error": n.0.clone() });
            return (StatusCode::NOT_FOUND, axum::Json(body)).into_response();
        }
        if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            let body = serde_json::json!({ "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        // Upstream API failures keep their kind so the operator can tell a
        // rejected request from an unreachable server.
        if let Some(f) = self.0.downcast_ref::<Failure>() {
            let status = match f {
                Failure::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            };
            let body = serde_json::json!({ "error": f.message(), "kind": f.kind() });
            return (status, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<TriageError>() {
            match e {
                TriageError::NotInitialized | TriageError::InvalidConfig(_) => {
                    StatusCode::BAD_REQUEST
                }
                TriageError::SubmissionNotFound(_) | TriageError::NoStagedFile(_) => {
                    StatusCode::NOT_FOUND
                }
                TriageError::Io(_) | TriageError::Yaml(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
