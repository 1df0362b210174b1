pub mod events;
pub mod notify;
pub mod queue;
pub mod submissions;

use triage_core::ActionOutcome;

use crate::error::AppError;

/// Map a finished row action onto an HTTP result.
pub(crate) fn outcome_result(outcome: ActionOutcome) -> Result<(), AppError> {
    match outcome {
        ActionOutcome::Completed => Ok(()),
        ActionOutcome::Skipped(reason) => Err(AppError::skipped(reason)),
        ActionOutcome::Failed(failure) => Err(AppError(failure.into())),
    }
}
