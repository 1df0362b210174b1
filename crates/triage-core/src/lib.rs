pub mod config;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod io;
pub mod paths;
pub mod types;
pub mod workqueue;

pub use error::{Failure, FailureKind, Result, TriageError};
pub use gateway::{Gateway, GatewayResult};
pub use types::{OverdueSubmission, StagedFile, StudentId, SubmissionId, TaskId};
pub use workqueue::{ActionOutcome, Notice, SkipReason, Workqueue};
