use std::sync::Arc;
use triage_core::Workqueue;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<Workqueue>,
}

impl AppState {
    pub fn new(queue: Arc<Workqueue>) -> Self {
        Self { queue }
    }
}
