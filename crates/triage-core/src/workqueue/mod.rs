//! The overdue-submission workqueue: snapshot store, search, and the two
//! guarded row actions.
//!
//! All state lives in one [`QueueState`] behind a mutex that is only held for
//! short synchronous sections and never across an `.await`. Each action
//! checks and takes its guard in a single critical section, suspends on the
//! gateway call, then reconciles in another. That keeps guard checks atomic
//! without any lock being held while a request is outstanding.

mod actions;
mod guard;
pub mod notice;
mod state;


use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;

use crate::error::Failure;
use crate::gateway::{Gateway, GatewayResult};
use crate::types::{
    OverdueSubmission, QueueSummary, RowView, StagedFile, StudentId, SubmissionId,
};

pub use actions::{ActionOutcome, SkipReason};
pub use notice::Notice;

use guard::InFlight;
use state::{GuardKey, QueueState};

const NOTICE_CAPACITY: usize = 64;

pub struct Workqueue {
    gateway: Arc<dyn Gateway>,
    state: Mutex<QueueState>,
    notices: broadcast::Sender<Notice>,
    action_timeout: Option<Duration>,
}

impl Workqueue {
    /// An empty workqueue. Call [`Workqueue::reload`] to fetch the first
    /// snapshot.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            gateway,
            state: Mutex::new(QueueState::default()),
            notices,
            action_timeout: None,
        }
    }

    /// Bound every gateway call. `None` waits forever.
    pub fn with_action_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.action_timeout = timeout;
        self
    }

    pub fn action_timeout(&self) -> Option<Duration> {
        self.action_timeout
    }

    /// Receive every [`Notice`] emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    /// Visible rows under the current search term.
    pub fn submissions(&self) -> Vec<OverdueSubmission> {
        let st = self.state();
        crate::filter::visible(&st.submissions, &st.search)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The whole snapshot, ignoring the search term.
    pub fn all_submissions(&self) -> Vec<OverdueSubmission> {
        self.state().submissions.clone()
    }

    pub fn submission(&self, id: SubmissionId) -> Option<OverdueSubmission> {
        self.state().find(id).cloned()
    }

    pub fn loading(&self) -> bool {
        self.state().loading()
    }

    pub fn search_term(&self) -> String {
        self.state().search.clone()
    }

    pub fn is_uploading(&self, id: SubmissionId) -> bool {
        self.state().uploading.contains_key(&id)
    }

    pub fn is_notifying(&self, student_id: StudentId) -> bool {
        self.state().notifying.contains_key(&student_id)
    }

    pub fn staged_file(&self, id: SubmissionId) -> Option<StagedFile> {
        self.state().staged.get(&id).cloned()
    }

    /// Visible rows joined with their staged file and in-flight flags.
    pub fn rows(&self) -> Vec<RowView> {
        let st = self.state();
        st.rows_matching(&st.search)
    }

    /// Like [`Workqueue::rows`] but with an explicit term, leaving the stored
    /// one alone.
    pub fn rows_matching(&self, term: &str) -> Vec<RowView> {
        self.state().rows_matching(term)
    }

    pub fn summary(&self) -> QueueSummary {
        let st = self.state();
        QueueSummary {
            loading: st.loading(),
            total: st.submissions.len(),
            visible: crate::filter::visible(&st.submissions, &st.search).len(),
            staged: st.staged.len(),
            uploading: st.uploading.len(),
            notifying: st.notifying.len(),
            search: st.search.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Store
    // -----------------------------------------------------------------------

    pub fn search(&self, term: impl Into<String>) {
        self.state().search = term.into();
    }

    /// Fetch a fresh snapshot and replace the list wholesale.
    ///
    /// On failure the previous snapshot stays in place. `loading` is raised
    /// for the duration and lowered on every exit path, after the snapshot is
    /// in place. Returns the number of rows now in the list: when a newer
    /// reload has already landed, this fetch is discarded, no `Reloaded`
    /// notice is sent, and the count is that of the applied snapshot.
    pub async fn reload(&self) -> GatewayResult<usize> {
        let (ticket, loading) = {
            let mut st = self.state();
            let ticket = st.issue_ticket();
            let loading = InFlight::acquire(&self.state, &mut st, GuardKey::Reload);
            (ticket, loading)
        };

        let result = self.bounded(self.gateway.load_overdue_submissions()).await;

        let applied = result.map(|rows| {
            let mut st = self.state();
            let count = rows.len();
            let fresh = st.apply_snapshot(ticket, rows);
            (fresh, if fresh { count } else { st.submissions.len() })
        });
        drop(loading);

        match applied {
            Ok((true, count)) => {
                tracing::info!(count, "overdue snapshot replaced");
                self.emit(Notice::Reloaded { count });
                Ok(count)
            }
            Ok((false, count)) => {
                tracing::debug!(ticket, "discarding snapshot older than the applied one");
                Ok(count)
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "reload failed; keeping previous snapshot");
                self.emit(Notice::ReloadFailed {
                    message: failure.message(),
                });
                Err(failure)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn state(&self) -> MutexGuard<'_, QueueState> {
        guard::lock(&self.state)
    }

    fn emit(&self, notice: Notice) {
        // No subscribers is fine.
        let _ = self.notices.send(notice);
    }

    async fn bounded<T>(&self, call: impl Future<Output = GatewayResult<T>>) -> GatewayResult<T> {
        match self.action_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(Failure::TimedOut(limit))),
            None => call.await,
        }
    }
}
