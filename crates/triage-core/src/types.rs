use bytes::Bytes;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub type SubmissionId = i64;
pub type StudentId = i64;
pub type TaskId = i64;

// ---------------------------------------------------------------------------
// OverdueSubmission
// ---------------------------------------------------------------------------

/// One (student, task) pairing the server considers overdue.
///
/// Text fields may be absent in the payload; they deserialize to `None` and
/// the filter treats them as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueSubmission {
    pub id: SubmissionId,
    pub student_id: StudentId,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_email: Option<String>,
    pub task_id: TaskId,
    #[serde(default)]
    pub task_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub task_expiry_date: Option<NaiveDate>,
}

impl OverdueSubmission {
    pub fn student_name(&self) -> &str {
        self.student_name.as_deref().unwrap_or("")
    }

    pub fn student_email(&self) -> &str {
        self.student_email.as_deref().unwrap_or("")
    }

    pub fn task_title(&self) -> &str {
        self.task_title.as_deref().unwrap_or("")
    }

    /// Name used in operator notices; falls back to the student id.
    pub fn display_name(&self) -> String {
        match self.student_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("student {}", self.student_id),
        }
    }
}

/// Accepts `YYYY-MM-DD`, a full RFC 3339 timestamp, or null.
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| serde::de::Error::custom(format!("invalid task_expiry_date '{raw}'")))
}

// ---------------------------------------------------------------------------
// StagedFile
// ---------------------------------------------------------------------------

/// A file an operator picked for a row, held in memory until uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl StagedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn info(&self) -> StagedFileInfo {
        StagedFileInfo {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            size: self.size(),
        }
    }
}

// File contents stay out of logs.
impl fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.size())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFileInfo {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: usize,
}

// ---------------------------------------------------------------------------
// Row views
// ---------------------------------------------------------------------------

/// A visible row joined with its ephemeral interaction state.
#[derive(Debug, Clone, Serialize)]
pub struct RowView {
    #[serde(flatten)]
    pub submission: OverdueSubmission,
    pub staged_file: Option<StagedFileInfo>,
    pub uploading: bool,
    pub notifying: bool,
}

/// Counts for a status line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueSummary {
    pub loading: bool,
    pub total: usize,
    pub visible: usize,
    pub staged: usize,
    pub uploading: usize,
    pub notifying: usize,
    pub search: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
