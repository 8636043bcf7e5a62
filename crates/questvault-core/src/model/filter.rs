//! In-memory filtering of listed records.

use serde::{Deserialize, Serialize};

use super::{Level, QuestionRecord, Semester};

/// Optional criteria applied to a catalog listing.
///
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFilter {
    pub level: Option<Level>,
    pub semester: Option<Semester>,
    /// Case-insensitive exact department match.
    pub department: Option<String>,
    pub year: Option<u16>,
    /// Case-insensitive substring over title, course code and department.
    pub search: Option<String>,
}

impl QuestionFilter {
    /// Returns `true` if no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.semester.is_none()
            && self.department.is_none()
            && self.year.is_none()
            && self.search.is_none()
    }

    /// Returns `true` if the record satisfies every criterion.
    pub fn matches(&self, record: &QuestionRecord) -> bool {
        if self.level.is_some_and(|level| level != record.level) {
            return false;
        }
        if self.semester.is_some_and(|semester| semester != record.semester) {
            return false;
        }
        if self.year.is_some_and(|year| year != record.year) {
            return false;
        }
        if let Some(department) = self.department.as_deref().map(str::trim)
            && !department.is_empty()
            && !record.department.eq_ignore_ascii_case(department)
        {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [&record.title, &record.course_code, &record.department]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }

    /// Retains only the matching records, preserving order.
    pub fn apply(&self, mut records: Vec<QuestionRecord>) -> Vec<QuestionRecord> {
        if !self.is_empty() {
            records.retain(|record| self.matches(record));
        }
        records
    }
}
