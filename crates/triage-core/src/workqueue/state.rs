use std::collections::{HashMap, HashSet};

use crate::filter;
use crate::types::{OverdueSubmission, RowView, StagedFile, StudentId, SubmissionId};

/// What an in-flight flag is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GuardKey {
    /// Notify is scoped to the student, matching the API's per-student reminder.
    Notify(StudentId),
    /// Upload is scoped to the row.
    Upload(SubmissionId),
    /// Reloads never exclude each other; they only keep `loading` raised.
    Reload,
}

/// Everything the workqueue mutates, kept behind one lock.
///
/// Guard sets map the key to the token of the action holding it, so a guard
/// released after a reload pruned (and someone re-took) the same key cannot
/// clear the newer holder's flag.
#[derive(Debug, Default)]
pub(crate) struct QueueState {
    pub submissions: Vec<OverdueSubmission>,
    pub search: String,
    pub staged: HashMap<SubmissionId, StagedFile>,
    pub notifying: HashMap<StudentId, u64>,
    pub uploading: HashMap<SubmissionId, u64>,
    pub reloads_in_flight: usize,
    next_token: u64,
    next_ticket: u64,
    applied_ticket: u64,
}

impl QueueState {
    pub fn loading(&self) -> bool {
        self.reloads_in_flight > 0
    }

    pub fn find(&self, id: SubmissionId) -> Option<&OverdueSubmission> {
        self.submissions.iter().find(|s| s.id == id)
    }

    /// Mark `key` as in flight. Returns the holder token, or `None` when the
    /// key is already held.
    pub fn try_mark(&mut self, key: GuardKey) -> Option<u64> {
        self.next_token += 1;
        let token = self.next_token;
        match key {
            GuardKey::Notify(student) => {
                if self.notifying.contains_key(&student) {
                    return None;
                }
                self.notifying.insert(student, token);
            }
            GuardKey::Upload(id) => {
                if self.uploading.contains_key(&id) {
                    return None;
                }
                self.uploading.insert(id, token);
            }
            GuardKey::Reload => self.reloads_in_flight += 1,
        }
        Some(token)
    }

    pub fn release(&mut self, key: GuardKey, token: u64) {
        match key {
            GuardKey::Notify(student) => {
                if self.notifying.get(&student) == Some(&token) {
                    self.notifying.remove(&student);
                }
            }
            GuardKey::Upload(id) => {
                if self.uploading.get(&id) == Some(&token) {
                    self.uploading.remove(&id);
                }
            }
            GuardKey::Reload => self.reloads_in_flight = self.reloads_in_flight.saturating_sub(1),
        }
    }

    /// Ticket ordering for overlapping reloads.
    pub fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Replace the snapshot wholesale and drop ephemeral state for rows and
    /// students that are gone. Returns `false` (and changes nothing) when a
    /// newer snapshot has already been applied.
    pub fn apply_snapshot(&mut self, ticket: u64, rows: Vec<OverdueSubmission>) -> bool {
        if ticket < self.applied_ticket {
            return false;
        }
        self.applied_ticket = ticket;

        let live_rows: HashSet<SubmissionId> = rows.iter().map(|r| r.id).collect();
        let live_students: HashSet<StudentId> = rows.iter().map(|r| r.student_id).collect();
        self.staged.retain(|id, _| live_rows.contains(id));
        self.uploading.retain(|id, _| live_rows.contains(id));
        self.notifying.retain(|student, _| live_students.contains(student));
        self.submissions = rows;
        true
    }

    pub fn rows_matching(&self, term: &str) -> Vec<RowView> {
        filter::visible(&self.submissions, term)
            .into_iter()
            .map(|s| RowView {
                submission: s.clone(),
                staged_file: self.staged.get(&s.id).map(StagedFile::info),
                uploading: self.uploading.contains_key(&s.id),
                notifying: self.notifying.contains_key(&s.student_id),
            })
            .collect()
    }
}
