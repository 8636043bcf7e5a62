//! Question model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use questvault_core::model::{NewQuestionRecord, QuestionRecord};
use uuid::Uuid;

use crate::schema::questions;
use crate::types::{QuestionLevel, QuestionSemester};

/// A row of the `questions` table.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Question {
    /// Unique question identifier
    pub id: Uuid,
    pub title: String,
    pub course_code: String,
    pub department: String,
    pub level: QuestionLevel,
    pub semester: QuestionSemester,
    /// Examination year (2000-2100)
    pub year: i16,
    /// Object key of the stored PDF
    pub blob_key: String,
    /// Public URL of the stored PDF
    pub pdf_url: String,
    /// Timestamp when the question was uploaded
    pub created_at: Timestamp,
}

/// Data for inserting a new question.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewQuestion {
    pub id: Uuid,
    pub title: String,
    pub course_code: String,
    pub department: String,
    pub level: QuestionLevel,
    pub semester: QuestionSemester,
    pub year: i16,
    pub blob_key: String,
    pub pdf_url: String,
}

impl From<NewQuestionRecord> for NewQuestion {
    fn from(record: NewQuestionRecord) -> Self {
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
            level: metadata.level.into(),
            semester: metadata.semester.into(),
            // Validated years are within 2000..=2100.
            year: i16::try_from(metadata.year).unwrap_or(i16::MAX),
            blob_key,
            pdf_url,
        }
    }
}

impl From<Question> for QuestionRecord {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            title: question.title,
            course_code: question.course_code,
            department: question.department,
            level: question.level.into(),
            semester: question.semester.into(),
            year: u16::try_from(question.year).unwrap_or_default(),
            blob_key: question.blob_key,
            pdf_url: question.pdf_url,
            created_at: question.created_at.into(),
        }
    }
}
