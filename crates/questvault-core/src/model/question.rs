//! Catalog record types.

use bytes::Bytes;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Level, Semester};

/// MIME type every stored question paper must carry.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Validated descriptive fields of a question paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionMetadata {
    /// Human-readable title, e.g. `Algorithms`.
    pub title: String,
    /// Course code, e.g. `CSC301`.
    pub course_code: String,
    /// Owning department.
    pub department: String,
    /// Study level.
    pub level: Level,
    /// Semester of the examination.
    pub semester: Semester,
    /// Four-digit examination year.
    pub year: u16,
}

/// Binary payload of an upload, as received from the gateway.
#[derive(Debug, Clone)]
pub struct QuestionUpload {
    /// Original client-side file name.
    pub file_name: String,
    /// Declared content type, if the client sent one.
    pub content_type: Option<String>,
    /// Raw file contents.
    pub bytes: Bytes,
}

impl QuestionUpload {
    /// Creates a new upload payload.
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Returns the payload size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the payload is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Record handed to a catalog store for insertion.
///
/// The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestionRecord {
    pub metadata: QuestionMetadata,
    pub blob_key: String,
    pub pdf_url: String,
}

/// One entry in the question catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: Uuid,
    pub title: String,
    pub course_code: String,
    pub department: String,
    pub level: Level,
    pub semester: Semester,
    pub year: u16,
    /// Key of the stored PDF inside the blob store.
    pub blob_key: String,
    pub pdf_url: String,
    pub created_at: Timestamp,
}

impl QuestionRecord {
    /// Materializes a new record with a fresh identifier and creation time.
    ///
    /// Used by stores that do not generate identifiers themselves.
    pub fn from_new(record: NewQuestionRecord) -> Self {
        let NewQuestionRecord {
            metadata,
            blob_key,
            pdf_url,
        } = record;

        Self {
            id: Uuid::now_v7(),
            title: metadata.title,
            course_code: metadata.course_code,
            department: metadata.department,
            level: metadata.level,
            semester: metadata.semester,
            year: metadata.year,
            blob_key,
            pdf_url,
            created_at: Timestamp::now(),
        }
    }

    /// Returns the descriptive fields of this record.
    pub fn metadata(&self) -> QuestionMetadata {
        QuestionMetadata {
            title: self.title.clone(),
            course_code: self.course_code.clone(),
            department: self.department.clone(),
            level: self.level,
            semester: self.semester,
            year: self.year,
        }
    }
}

/// Sorts records newest first, breaking ties by identifier.
pub fn sort_newest_first(records: &mut [QuestionRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
