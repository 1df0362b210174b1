use serde::Serialize;
use thiserror::Error;

use super::guard::InFlight;
use super::notice::Notice;
use super::state::GuardKey;
use super::Workqueue;
use crate::error::{Failure, Result, TriageError};
use crate::types::{StagedFile, StudentId, SubmissionId, TaskId};

/// How a row action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The request went out and the API accepted it.
    Completed,
    /// The action was not allowed to start; no request was sent.
    Skipped(SkipReason),
    /// The request went out (or timed out) and did not succeed.
    Failed(Failure),
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ActionOutcome::Completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("a notification for student {student_id} is already in flight")]
    AlreadyNotifying { student_id: StudentId },

    #[error("an upload for submission {submission_id} is already in flight")]
    AlreadyUploading { submission_id: SubmissionId },

    #[error("no file staged for submission {submission_id}")]
    NoStagedFile { submission_id: SubmissionId },

    #[error("submission {submission_id} is not in the current snapshot")]
    UnknownSubmission { submission_id: SubmissionId },
}

impl Workqueue {
    /// Stage `file` for row `id`, replacing any file already staged there.
    ///
    /// Only rows in the current snapshot can hold a staged file.
    pub fn stage_file(&self, id: SubmissionId, file: StagedFile) -> Result<()> {
        let mut st = self.state();
        if st.find(id).is_none() {
            return Err(TriageError::SubmissionNotFound(id));
        }
        tracing::debug!(submission_id = id, file = %file.file_name, size = file.size(), "file staged");
        st.staged.insert(id, file);
        Ok(())
    }

    /// Discard the staged file for row `id`, returning it if there was one.
    pub fn unstage_file(&self, id: SubmissionId) -> Option<StagedFile> {
        self.state().staged.remove(&id)
    }

    /// Send an overdue reminder to `student_id` for `task_id`.
    ///
    /// Skipped when a notify for the same student is already outstanding.
    /// The snapshot is not touched either way.
    pub async fn notify(&self, student_id: StudentId, task_id: TaskId) -> ActionOutcome {
        let guard = {
            let mut st = self.state();
            InFlight::acquire(&self.state, &mut st, GuardKey::Notify(student_id))
        };
        let Some(guard) = guard else {
            tracing::debug!(student_id, "notify skipped; already in flight");
            return ActionOutcome::Skipped(SkipReason::AlreadyNotifying { student_id });
        };

        tracing::debug!(student_id, task_id, "sending overdue notification");
        let result = self.bounded(self.gateway.notify(student_id, task_id)).await;
        drop(guard);

        match result {
            Ok(()) => {
                tracing::info!(student_id, task_id, "overdue notification sent");
                self.emit(Notice::Notified {
                    student_id,
                    task_id,
                });
                ActionOutcome::Completed
            }
            Err(failure) => {
                tracing::warn!(student_id, task_id, error = %failure, "notification failed");
                self.emit(Notice::NotifyFailed {
                    student_id,
                    task_id,
                    message: failure.message(),
                });
                ActionOutcome::Failed(failure)
            }
        }
    }

    /// Upload the staged file for row `id` on the student's behalf.
    ///
    /// Skipped when the row is unknown, nothing is staged, or an upload for
    /// the row is already outstanding. On success the uploaded file is
    /// cleared (unless a different one was staged meanwhile) and the snapshot
    /// is reloaded once; on failure the staged file stays so the operator can
    /// retry.
    pub async fn submit_on_behalf(&self, id: SubmissionId) -> ActionOutcome {
        let (row, file, guard) = {
            let mut st = self.state();
            let Some(row) = st.find(id).cloned() else {
                return ActionOutcome::Skipped(SkipReason::UnknownSubmission { submission_id: id });
            };
            let Some(file) = st.staged.get(&id).cloned() else {
                return ActionOutcome::Skipped(SkipReason::NoStagedFile { submission_id: id });
            };
            let Some(guard) = InFlight::acquire(&self.state, &mut st, GuardKey::Upload(id)) else {
                return ActionOutcome::Skipped(SkipReason::AlreadyUploading { submission_id: id });
            };
            (row, file, guard)
        };

        tracing::debug!(
            submission_id = id,
            student_id = row.student_id,
            task_id = row.task_id,
            file = %file.file_name,
            "uploading submission on behalf of student"
        );
        let result = self
            .bounded(self.gateway.upload_on_behalf(row.student_id, row.task_id, file.clone()))
            .await;
        drop(guard);

        match result {
            Ok(()) => {
                {
                    // A file re-staged during the upload was never sent; keep it.
                    let mut st = self.state();
                    if st.staged.get(&id) == Some(&file) {
                        st.staged.remove(&id);
                    }
                }
                let student_name = row.display_name();
                tracing::info!(submission_id = id, student = %student_name, "submission uploaded");
                self.emit(Notice::Submitted {
                    submission_id: id,
                    student_name,
                });
                // The row's overdue status is the server's call; refetch.
                let _ = self.reload().await;
                ActionOutcome::Completed
            }
            Err(failure) => {
                tracing::warn!(submission_id = id, error = %failure, "upload failed; file kept staged");
                self.emit(Notice::SubmitFailed {
                    submission_id: id,
                    message: failure.message(),
                });
                ActionOutcome::Failed(failure)
            }
        }
    }
}
