use std::time::Duration;
use thiserror::Error;

use crate::types::SubmissionId;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("not initialized: run 'triage init'")]
    NotInitialized,

    #[error("overdue submission not found: {0}")]
    SubmissionNotFound(SubmissionId),

    #[error("no file staged for submission {0}")]
    NoStagedFile(SubmissionId),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;

// ---------------------------------------------------------------------------
// Failure — the outcome of a gateway call that did not succeed
// ---------------------------------------------------------------------------

/// Why a single workqueue action failed.
///
/// Every variant carries an operator-facing message. The workqueue treats all
/// of them the same way: the action ends, the message is reported, and no
/// unrelated state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    /// The API could not be reached (DNS, connect, reset).
    #[error("{0}")]
    Transport(String),

    /// The API rejected the request (4xx, `success: false`, missing file).
    #[error("{0}")]
    Validation(String),

    /// Anything not classifiable: 5xx, undecodable body.
    #[error("{0}")]
    Unknown(String),

    /// The action timeout elapsed before the API answered.
    #[error("request timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

impl Failure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Failure::Transport(_) => FailureKind::Transport,
            Failure::Validation(_) => FailureKind::Validation,
            Failure::Unknown(_) => FailureKind::Unknown,
            Failure::TimedOut(_) => FailureKind::TimedOut,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Validation,
    Unknown,
    TimedOut,
}
