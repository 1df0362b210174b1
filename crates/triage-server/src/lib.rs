pub mod error;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use triage_core::Workqueue;

/// Largest file accepted for staging.
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(queue: Arc<Workqueue>) -> Router {
    let app_state = state::AppState::new(queue);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Queue
        .route("/api/summary", get(routes::queue::get_summary))
        .route("/api/search", put(routes::queue::put_search))
        .route("/api/reload", post(routes::queue::reload))
        // Submissions
        .route(
            "/api/submissions",
            get(routes::submissions::list_submissions),
        )
        .route(
            "/api/submissions/{id}/file",
            put(routes::submissions::stage_file)
                .delete(routes::submissions::unstage_file)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/submissions/{id}/submit",
            post(routes::submissions::submit),
        )
        // Notifications
        .route("/api/notify", post(routes::notify::notify))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Load the first snapshot in the background and serve on `0.0.0.0:port`.
pub async fn serve(queue: Arc<Workqueue>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(queue, listener).await
}

/// Like `serve`, on a pre-bound listener.
///
/// The caller can read the actual port before starting (useful when
/// `port = 0` and the OS picks a free port).
pub async fn serve_on(
    queue: Arc<Workqueue>,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();

    let initial = Arc::clone(&queue);
    tokio::spawn(async move {
        if let Err(e) = initial.reload().await {
            tracing::warn!(error = %e, "initial load failed; POST /api/reload to retry");
        }
    });

    let app = build_router(queue);
    tracing::info!("triage server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
