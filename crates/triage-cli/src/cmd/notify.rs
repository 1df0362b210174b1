use crate::cmd::{expect_completed, open_queue, runtime};
use crate::output::print_json;
use std::path::Path;
use triage_core::{StudentId, TaskId};

pub fn run(root: &Path, student_id: StudentId, task_id: TaskId, json: bool) -> anyhow::Result<()> {
    let queue = open_queue(root)?;
    expect_completed(runtime()?.block_on(queue.notify(student_id, task_id)))?;

    if json {
        print_json(&serde_json::json!({
            "status": "completed",
            "student_id": student_id,
            "task_id": task_id,
        }))
    } else {
        println!("Notification sent to student {student_id} for task {task_id}.");
        Ok(())
    }
}
