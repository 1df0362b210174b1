use crate::cmd::{expect_completed, open_queue, runtime};
use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use triage_core::{StagedFile, SubmissionId};

pub fn run(root: &Path, id: SubmissionId, file: &Path, json: bool) -> anyhow::Result<()> {
    let staged = read_staged_file(file)?;
    let queue = open_queue(root)?;
    let rt = runtime()?;

    // Rows only exist once a snapshot is loaded.
    rt.block_on(queue.reload())?;
    let row = queue
        .submission(id)
        .with_context(|| format!("submission {id} is not in the overdue list"))?;

    let info = staged.info();
    queue.stage_file(id, staged)?;
    expect_completed(rt.block_on(queue.submit_on_behalf(id)))?;

    if json {
        print_json(&serde_json::json!({
            "status": "completed",
            "submission_id": id,
            "student_id": row.student_id,
            "task_id": row.task_id,
            "file": info,
        }))
    } else {
        println!(
            "Uploaded {} ({} bytes) on behalf of {} for {}.",
            info.file_name,
            info.size,
            row.display_name(),
            if row.task_title().is_empty() {
                format!("task {}", row.task_id)
            } else {
                row.task_title().to_string()
            }
        );
        Ok(())
    }
}

fn read_staged_file(path: &Path) -> anyhow::Result<StagedFile> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if bytes.is_empty() {
        anyhow::bail!("{} is empty", path.display());
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;

    let mut staged = StagedFile::new(name, bytes);
    if let Some(mime) = mime_guess::from_path(path).first() {
        staged = staged.with_content_type(mime.to_string());
    }
    Ok(staged)
}
