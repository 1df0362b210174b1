use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use futures::future::BoxFuture;
use futures::FutureExt;
use http_body_util::BodyExt;
use tower::ServiceExt;
use triage_core::{
    Failure, Gateway, GatewayResult, OverdueSubmission, StagedFile, StudentId, TaskId, Workqueue,
};

// ---------------------------------------------------------------------------
// Fake gateway
// ---------------------------------------------------------------------------

struct FakeGateway {
    rows: Mutex<GatewayResult<Vec<OverdueSubmission>>>,
    notify_result: Mutex<GatewayResult<()>>,
    upload_result: Mutex<GatewayResult<()>>,
    load_calls: AtomicUsize,
    uploads: Mutex<Vec<(StudentId, TaskId, String)>>,
}

impl FakeGateway {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(Ok(two_rows())),
            notify_result: Mutex::new(Ok(())),
            upload_result: Mutex::new(Ok(())),
            load_calls: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        })
    }
}

impl Gateway for FakeGateway {
    fn load_overdue_submissions(&self) -> BoxFuture<'_, GatewayResult<Vec<OverdueSubmission>>> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.rows.lock().unwrap().clone();
        async move { result }.boxed()
    }

    fn notify(&self, _student_id: StudentId, _task_id: TaskId) -> BoxFuture<'_, GatewayResult<()>> {
        let result = self.notify_result.lock().unwrap().clone();
        async move { result }.boxed()
    }

    fn upload_on_behalf(
        &self,
        student_id: StudentId,
        task_id: TaskId,
        file: StagedFile,
    ) -> BoxFuture<'_, GatewayResult<()>> {
        self.uploads
            .lock()
            .unwrap()
            .push((student_id, task_id, file.file_name.clone()));
        let result = self.upload_result.lock().unwrap().clone();
        async move { result }.boxed()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row(id: i64, student_id: i64, name: &str, task_id: i64, title: &str) -> OverdueSubmission {
    OverdueSubmission {
        id,
        student_id,
        student_name: Some(name.to_string()),
        student_email: Some(format!("{}@school.edu", name.to_lowercase().replace(' ', "."))),
        task_id,
        task_title: Some(title.to_string()),
        task_expiry_date: None,
    }
}

fn two_rows() -> Vec<OverdueSubmission> {
    vec![
        row(1, 9, "Maria Lopez", 5, "Essay 1"),
        row(2, 10, "John Smith", 6, "Lab Report"),
    ]
}

/// A router over a workqueue that has already loaded its first snapshot.
async fn loaded_app(gateway: Arc<FakeGateway>) -> (axum::Router, Arc<Workqueue>) {
    let queue = Arc::new(Workqueue::new(gateway));
    queue.reload().await.unwrap();
    (triage_server::build_router(Arc::clone(&queue)), queue)
}

async fn send(
    app: &axum::Router,
    req: axum::http::Request<axum::body::Body>,
) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a request with an empty body via `oneshot` and return (status, parsed JSON body).
async fn call(app: &axum::Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    send(app, req).await
}

async fn send_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, req).await
}

async fn put_file(app: &axum::Router, uri: &str, bytes: &'static [u8]) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/octet-stream")
        .body(axum::body::Body::from(bytes))
        .unwrap();
    send(app, req).await
}

// ---------------------------------------------------------------------------
// Listing and search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_returns_all_rows_with_interaction_state() {
    let (app, _) = loaded_app(FakeGateway::new()).await;

    let (status, json) = call(&app, "GET", "/api/submissions").await;
    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], 1);
    assert_eq!(rows[0]["student_name"], "Maria Lopez");
    assert_eq!(rows[0]["uploading"], false);
    assert_eq!(rows[0]["notifying"], false);
    assert!(rows[0]["staged_file"].is_null());
}

#[tokio::test]
async fn search_query_filters_case_insensitively() {
    let (app, _) = loaded_app(FakeGateway::new()).await;

    let (_, json) = call(&app, "GET", "/api/submissions?search=MARIA").await;
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 1);

    let (_, json) = call(&app, "GET", "/api/submissions?search=lab").await;
    assert_eq!(json.as_array().unwrap()[0]["id"], 2);
}

#[tokio::test]
async fn stored_search_term_applies_to_list_and_summary() {
    let (app, queue) = loaded_app(FakeGateway::new()).await;

    let (status, json) = send_json(&app, "PUT", "/api/search", serde_json::json!({"term": "smith"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["search"], "smith");
    assert_eq!(json["total"], 2);
    assert_eq!(json["visible"], 1);
    assert_eq!(queue.search_term(), "smith");

    let (_, json) = call(&app, "GET", "/api/submissions").await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["student_name"], "John Smith");
}

#[tokio::test]
async fn summary_counts_rows() {
    let (app, _) = loaded_app(FakeGateway::new()).await;

    let (status, json) = call(&app, "GET", "/api/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    assert_eq!(json["visible"], 2);
    assert_eq!(json["staged"], 0);
    assert_eq!(json["loading"], false);
}

// ---------------------------------------------------------------------------
// Reload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reload_reports_row_count() {
    let gateway = FakeGateway::new();
    let (app, _) = loaded_app(Arc::clone(&gateway)).await;

    let (status, json) = call(&app, "POST", "/api/reload").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    assert_eq!(gateway.load_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn reload_failure_keeps_snapshot_and_returns_502() {
    let gateway = FakeGateway::new();
    let (app, queue) = loaded_app(Arc::clone(&gateway)).await;
    *gateway.rows.lock().unwrap() = Err(Failure::Transport("Failed to load overdue submissions".into()));

    let (status, json) = call(&app, "POST", "/api/reload").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "Failed to load overdue submissions");
    assert_eq!(json["kind"], "transport");
    assert_eq!(queue.all_submissions().len(), 2);
}

// ---------------------------------------------------------------------------
// Staging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stage_and_unstage_file() {
    let (app, queue) = loaded_app(FakeGateway::new()).await;

    let (status, json) = put_file(&app, "/api/submissions/1/file?name=essay.pdf", b"%PDF-1.4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["staged_file"]["file_name"], "essay.pdf");
    assert_eq!(json["staged_file"]["content_type"], "application/pdf");
    assert_eq!(json["staged_file"]["size"], 8);
    assert!(queue.staged_file(1).is_some());

    let (_, json) = call(&app, "GET", "/api/submissions").await;
    assert_eq!(json[0]["staged_file"]["file_name"], "essay.pdf");

    let (status, _) = call(&app, "DELETE", "/api/submissions/1/file").await;
    assert_eq!(status, StatusCode::OK);
    assert!(queue.staged_file(1).is_none());

    let (status, _) = call(&app, "DELETE", "/api/submissions/1/file").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stage_for_unknown_row_is_404() {
    let (app, _) = loaded_app(FakeGateway::new()).await;
    let (status, json) = put_file(&app, "/api/submissions/99/file?name=essay.pdf", b"data").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("99"));
}

#[tokio::test]
async fn stage_empty_body_is_400() {
    let (app, queue) = loaded_app(FakeGateway::new()).await;
    let (status, _) = put_file(&app, "/api/submissions/1/file?name=empty.txt", b"").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(queue.staged_file(1).is_none());
}

// ---------------------------------------------------------------------------
// Submit on behalf
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_without_staged_file_is_409() {
    let gateway = FakeGateway::new();
    let (app, _) = loaded_app(Arc::clone(&gateway)).await;

    let (status, json) = call(&app, "POST", "/api/submissions/1/submit").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("no file staged"));
    assert!(gateway.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn submit_unknown_row_is_404() {
    let (app, _) = loaded_app(FakeGateway::new()).await;
    let (status, _) = call(&app, "POST", "/api/submissions/42/submit").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_uploads_then_reloads() {
    let gateway = FakeGateway::new();
    let (app, queue) = loaded_app(Arc::clone(&gateway)).await;
    put_file(&app, "/api/submissions/2/file?name=lab.pdf", b"%PDF-1.4").await;

    let (status, json) = call(&app, "POST", "/api/submissions/2/submit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "completed");
    assert_eq!(
        *gateway.uploads.lock().unwrap(),
        vec![(10, 6, "lab.pdf".to_string())]
    );
    assert!(queue.staged_file(2).is_none());
    assert_eq!(gateway.load_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn submit_failure_keeps_staged_file_and_returns_502() {
    let gateway = FakeGateway::new();
    *gateway.upload_result.lock().unwrap() = Err(Failure::Validation("Task is closed".into()));
    let (app, queue) = loaded_app(Arc::clone(&gateway)).await;
    put_file(&app, "/api/submissions/1/file?name=essay.pdf", b"%PDF-1.4").await;

    let (status, json) = call(&app, "POST", "/api/submissions/1/submit").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "Task is closed");
    assert_eq!(json["kind"], "validation");
    assert!(queue.staged_file(1).is_some());
    assert!(!queue.is_uploading(1));
}

// ---------------------------------------------------------------------------
// Notify
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notify_completes() {
    let (app, queue) = loaded_app(FakeGateway::new()).await;

    let (status, json) = send_json(
        &app,
        "POST",
        "/api/notify",
        serde_json::json!({"student_id": 9, "task_id": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["student_id"], 9);
    assert!(!queue.is_notifying(9));
}

#[tokio::test]
async fn notify_failure_returns_502_with_message() {
    let gateway = FakeGateway::new();
    *gateway.notify_result.lock().unwrap() = Err(Failure::Unknown("Failed to send notification".into()));
    let (app, _) = loaded_app(gateway).await;

    let (status, json) = send_json(
        &app,
        "POST",
        "/api/notify",
        serde_json::json!({"student_id": 9, "task_id": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "Failed to send notification");
    assert_eq!(json["kind"], "unknown");
}

#[tokio::test]
async fn notify_rejects_malformed_body() {
    let (app, _) = loaded_app(FakeGateway::new()).await;
    let (status, _) = send_json(&app, "POST", "/api/notify", serde_json::json!({"student_id": "x"})).await;
    assert!(status.is_client_error());
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn events_endpoint_is_an_sse_stream() {
    let (app, _) = loaded_app(FakeGateway::new()).await;
    let req = axum::http::Request::builder()
        .uri("/api/events")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ct = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(ct.starts_with("text/event-stream"), "got {ct}");
}
