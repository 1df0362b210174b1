use serde::Serialize;

use crate::types::{StudentId, SubmissionId, TaskId};

/// Operator-facing signal emitted when a workqueue action finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    Reloaded {
        count: usize,
    },
    ReloadFailed {
        message: String,
    },
    Notified {
        student_id: StudentId,
        task_id: TaskId,
    },
    NotifyFailed {
        student_id: StudentId,
        task_id: TaskId,
        message: String,
    },
    Submitted {
        submission_id: SubmissionId,
        student_name: String,
    },
    SubmitFailed {
        submission_id: SubmissionId,
        message: String,
    },
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::ReloadFailed { .. } | Notice::NotifyFailed { .. } | Notice::SubmitFailed { .. }
        )
    }

    /// One-line text for a toast or a terminal.
    pub fn message(&self) -> String {
        match self {
            Notice::Reloaded { count } => format!("Loaded {count} overdue submissions"),
            Notice::ReloadFailed { message } => message.clone(),
            Notice::Notified { student_id, .. } => {
                format!("Notification sent to student {student_id}")
            }
            Notice::NotifyFailed { message, .. } => message.clone(),
            Notice::Submitted { student_name, .. } => {
                format!("Submission uploaded on behalf of {student_name}")
            }
            Notice::SubmitFailed { message, .. } => message.clone(),
        }
    }
}
