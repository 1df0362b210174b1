use futures::future::BoxFuture;

use crate::error::Failure;
use crate::types::{OverdueSubmission, StagedFile, StudentId, TaskId};

pub type GatewayResult<T> = std::result::Result<T, Failure>;

/// The remote API the workqueue reads from and acts through.
///
/// Implementations never panic for expected failures; network and validation
/// errors both come back as [`Failure`] with an operator-facing message.
pub trait Gateway: Send + Sync {
    /// The server's full current overdue snapshot.
    fn load_overdue_submissions(&self) -> BoxFuture<'_, GatewayResult<Vec<OverdueSubmission>>>;

    /// Ask the server to remind `student_id` about `task_id`.
    fn notify(&self, student_id: StudentId, task_id: TaskId) -> BoxFuture<'_, GatewayResult<()>>;

    /// Submit `file` for `task_id` on behalf of `student_id`.
    fn upload_on_behalf(
        &self,
        student_id: StudentId,
        task_id: TaskId,
        file: StagedFile,
    ) -> BoxFuture<'_, GatewayResult<()>>;
}
