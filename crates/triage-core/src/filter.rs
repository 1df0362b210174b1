use crate::types::OverdueSubmission;

/// Rows whose student name, email, or task title contains `term`,
/// case-insensitively. An empty term matches everything. Source order is kept.
pub fn visible<'a>(submissions: &'a [OverdueSubmission], term: &str) -> Vec<&'a OverdueSubmission> {
    if term.is_empty() {
        return submissions.iter().collect();
    }
    let needle = term.to_lowercase();
    submissions.iter().filter(|s| matches(s, &needle)).collect()
}

/// `needle` must already be lower-cased.
pub fn matches(submission: &OverdueSubmission, needle: &str) -> bool {
    [
        submission.student_name(),
        submission.student_email(),
        submission.task_title(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}
