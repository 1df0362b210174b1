use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::state::AppState;

/// GET /api/events — SSE stream of workqueue notices.
///
/// Each notice is sent as a `notice` event whose data is the JSON-encoded
/// [`triage_core::Notice`]. A subscriber that falls behind skips the notices
/// it missed.
pub async fn sse_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let rx = app.queue.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        let notice = msg.ok()?;
        Event::default()
            .event("notice")
            .json_data(&notice)
            .ok()
            .map(Ok::<Event, Infallible>)
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
