use jiff::Timestamp;
use questvault_core::model::{Level, QuestionRecord, Semester};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog entry as exposed to clients.
///
/// The internal blob key is never exposed; clients download through `pdf_url`.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub course_code: String,
    pub department: String,
    pub level: Level,
    pub semester: Semester,
    pub year: u16,
    /// Publicly retrievable URL of the PDF.
    pub pdf_url: String,
    pub created_at: Timestamp,
}

impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            course_code: record.course_code,
            department: record.department,
            level: record.level,
            semester: record.semester,
            year: record.year,
            pdf_url: record.pdf_url,
            created_at: record.created_at,
        }
    }
}

/// Response to a successful upload.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Uploaded {
    pub message: String,
    /// The created record.
    pub data: Question,
}

/// Plain acknowledgement.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Message {
    pub message: String,
}

impl Message {
    /// Creates a new acknowledgement.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
