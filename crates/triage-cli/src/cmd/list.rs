use crate::cmd::{open_queue, runtime};
use crate::output::{print_json, print_table, truncate};
use std::path::Path;
use triage_core::types::RowView;

pub fn run(root: &Path, search: Option<&str>, json: bool) -> anyhow::Result<()> {
    let queue = open_queue(root)?;
    runtime()?.block_on(queue.reload())?;

    let rows = queue.rows_matching(search.unwrap_or_default());
    if json {
        return print_json(&rows);
    }

    if rows.is_empty() {
        match search {
            Some(term) => println!("No overdue submissions match '{term}'."),
            None => println!("No overdue submissions."),
        }
        return Ok(());
    }

    let table: Vec<Vec<String>> = rows.iter().map(table_row).collect();
    print_table(
        &["ID", "STUDENT", "EMAIL", "TASK", "TASK ID", "DUE"],
        &table,
    );
    println!("\n{} of {} overdue", rows.len(), queue.all_submissions().len());
    Ok(())
}

fn table_row(row: &RowView) -> Vec<String> {
    let s = &row.submission;
    vec![
        s.id.to_string(),
        truncate(&s.display_name(), 28),
        truncate(s.student_email(), 32),
        truncate(s.task_title(), 32),
        s.task_id.to_string(),
        s.task_expiry_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
    ]
}
