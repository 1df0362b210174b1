use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use triage_core::Failure;

use crate::types::{is_envelope, Envelope};

// ─── Classification ───────────────────────────────────────────────────────

/// Turn a status and raw body into the payload or a [`Failure`].
///
/// - 4xx → `Validation`, 5xx and other non-success → `Unknown`
/// - an envelope with `success: false` → `Validation`
/// - a success body that does not decode → `Unknown`
///
/// The server's `message`/`error` text is preferred; `fallback` is used when
/// the body has none. `Ok(None)` means a success with no payload (empty body
/// or an envelope without `data`).
pub(crate) fn classify<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    fallback: &str,
) -> Result<Option<T>, Failure> {
    let json: Option<serde_json::Value> = if body.trim().is_empty() {
        None
    } else {
        serde_json::from_str(body).ok()
    };
    let server_message = json.as_ref().and_then(message_of);
    let message = || server_message.clone().unwrap_or_else(|| fallback.to_string());

    if status.is_client_error() {
        return Err(Failure::Validation(message()));
    }
    if !status.is_success() {
        return Err(Failure::Unknown(message()));
    }

    let Some(json) = json else {
        if body.trim().is_empty() {
            return Ok(None);
        }
        tracing::warn!(%status, "success response is not JSON");
        return Err(Failure::Unknown(fallback.to_string()));
    };

    if is_envelope(&json) {
        let envelope: Envelope<T> = serde_json::from_value(json).map_err(|e| {
            tracing::warn!(error = %e, "could not decode response envelope");
            Failure::Unknown(fallback.to_string())
        })?;
        if envelope.success == Some(false) {
            return Err(Failure::Validation(message()));
        }
        return Ok(envelope.data);
    }

    serde_json::from_value(json).map(Some).map_err(|e| {
        tracing::warn!(error = %e, "could not decode response body");
        Failure::Unknown(fallback.to_string())
    })
}

/// Map a transport-level reqwest error.
pub(crate) fn transport_failure(err: &reqwest::Error, fallback: &str) -> Failure {
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        Failure::Transport(fallback.to_string())
    } else {
        Failure::Unknown(fallback.to_string())
    }
}

fn message_of(json: &serde_json::Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|k| json.get(*k).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string)
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "Failed to send notification";

    fn ack(status: u16, body: &str) -> Result<Option<serde_json::Value>, Failure> {
        classify(StatusCode::from_u16(status).unwrap(), body, FALLBACK)
    }

    #[test]
    fn success_envelope_yields_data() {
        let out: Option<Vec<i64>> = classify(
            StatusCode::OK,
            r#"{"success": true, "data": [1, 2], "message": "ok"}"#,
            FALLBACK,
        )
        .unwrap();
        assert_eq!(out, Some(vec![1, 2]));
    }

    #[test]
    fn bare_array_is_accepted() {
        let out: Option<Vec<i64>> = classify(StatusCode::OK, "[]", FALLBACK).unwrap();
        assert_eq!(out, Some(vec![]));
    }

    #[test]
    fn empty_body_is_success_without_payload() {
        assert_eq!(ack(204, "").unwrap(), None);
    }

    #[test]
    fn client_error_uses_server_message() {
        let err = ack(422, r#"{"success": false, "data": {}, "message": "Task not found"}"#)
            .unwrap_err();
        assert_eq!(err, Failure::Validation("Task not found".into()));
    }

    #[test]
    fn error_field_is_read_when_message_missing() {
        let err = ack(400, r#"{"error": "student_id is required"}"#).unwrap_err();
        assert_eq!(err, Failure::Validation("student_id is required".into()));
    }

    #[test]
    fn server_error_without_body_falls_back() {
        let err = ack(500, "").unwrap_err();
        assert_eq!(err, Failure::Unknown(FALLBACK.into()));
    }

    #[test]
    fn html_error_page_falls_back() {
        let err = ack(502, "<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err, Failure::Unknown(FALLBACK.into()));
    }

    #[test]
    fn success_false_is_validation() {
        let err = ack(200, r#"{"success": false, "message": "  "}"#).unwrap_err();
        assert_eq!(err, Failure::Validation(FALLBACK.into()));
    }

    #[test]
    fn undecodable_success_body_is_unknown() {
        let out: Result<Option<Vec<i64>>, _> =
            classify(StatusCode::OK, r#"{"success": true, "data": "nope"}"#, FALLBACK);
        assert_eq!(out.unwrap_err(), Failure::Unknown(FALLBACK.into()));
    }
}
