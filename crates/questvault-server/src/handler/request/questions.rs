use std::str::FromStr;

use questvault_core::model::{Level, QuestionFilter, Semester};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::handler::{ErrorKind, Result};

/// Query parameters accepted by the question listing.
///
/// Every parameter is optional; blank values are ignored.
#[must_use]
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListQuestions {
    /// Study level: `ND1`, `ND2`, `HND1` or `HND2`.
    pub level: Option<String>,
    /// `First Semester` or `Second Semester`.
    pub semester: Option<String>,
    /// Department, matched case-insensitively.
    pub department: Option<String>,
    /// Examination year.
    pub year: Option<String>,
    /// Free-text search over title, course code and department.
    pub search: Option<String>,
}

impl ListQuestions {
    /// Parses the parameters into a catalog filter.
    ///
    /// Unknown levels, semesters and non-numeric years are rejected with an
    /// error naming the parameter.
    pub fn into_filter(self) -> Result<QuestionFilter> {
        let level = non_blank(self.level)
            .map(|value| {
                Level::from_str(&value).map_err(|_| {
                    ErrorKind::BadRequest
                        .with_message(format!(
                            "level must be one of ND1, ND2, HND1, HND2, got '{value}'"
                        ))
                        .with_resource("level")
                })
            })
            .transpose()?;

        let semester = non_blank(self.semester)
            .map(|value| {
                Semester::from_str(&value).map_err(|_| {
                    ErrorKind::BadRequest
                        .with_message(format!(
                            "semester must be 'First Semester' or 'Second Semester', got '{value}'"
                        ))
                        .with_resource("semester")
                })
            })
            .transpose()?;

        let year = non_blank(self.year)
            .map(|value| {
                value.parse::<u16>().map_err(|_| {
                    ErrorKind::BadRequest
                        .with_message(format!("year must be a number, got '{value}'"))
                        .with_resource("year")
                })
            })
            .transpose()?;

        Ok(QuestionFilter {
            level,
            semester,
            department: non_blank(self.department),
            year,
            search: non_blank(self.search),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
