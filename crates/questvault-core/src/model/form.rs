//! Validation of raw upload form fields.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Level, PDF_CONTENT_TYPE, QuestionMetadata, QuestionUpload, Semester};
use crate::{Error, Result};

/// Earliest accepted examination year.
pub const MIN_YEAR: u16 = 2000;

/// Latest accepted examination year.
pub const MAX_YEAR: u16 = 2100;

/// Untyped metadata fields exactly as submitted by a client.
///
/// Missing and blank values are treated the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionForm {
    pub title: Option<String>,
    pub course_code: Option<String>,
    pub department: Option<String>,
    pub level: Option<String>,
    pub semester: Option<String>,
    pub year: Option<String>,
}

impl QuestionForm {
    /// Assigns a named form field, ignoring names that are not metadata.
    ///
    /// Returns `false` for unrecognized names.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "title" => &mut self.title,
            "course_code" => &mut self.course_code,
            "department" => &mut self.department,
            "level" => &mut self.level,
            "semester" => &mut self.semester,
            "year" => &mut self.year,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Validates every field, failing on the first offending one.
    pub fn validate(&self) -> Result<QuestionMetadata> {
        let title = required_text("title", self.title.as_deref())?;
        let course_code = required_text("course_code", self.course_code.as_deref())?;
        let department = required_text("department", self.department.as_deref())?;

        let level = required_text("level", self.level.as_deref())?;
        let level = Level::from_str(&level).map_err(|_| {
            Error::validation("level", "level must be one of ND1, ND2, HND1, HND2")
        })?;

        let semester = required_text("semester", self.semester.as_deref())?;
        let semester = Semester::from_str(&semester).map_err(|_| {
            Error::validation(
                "semester",
                "semester must be either First Semester or Second Semester",
            )
        })?;

        let year = parse_year(self.year.as_deref())?;

        Ok(QuestionMetadata {
            title,
            course_code,
            department,
            level,
            semester,
            year,
        })
    }
}

fn required_text(field: &'static str, value: Option<&str>) -> Result<String> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_owned()),
        _ => Err(Error::validation(field, format!("{field} is required"))),
    }
}

/// Parses and range-checks a four-digit examination year.
pub fn parse_year(value: Option<&str>) -> Result<u16> {
    let value = required_text("year", value)?;
    let year = value
        .parse::<u16>()
        .map_err(|_| Error::validation("year", "year must be an integer"))?;

    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(Error::validation(
            "year",
            format!("year must be between {MIN_YEAR} and {MAX_YEAR}"),
        ));
    }

    Ok(year)
}

/// Checks presence, content type and size of an uploaded file.
pub fn validate_upload(upload: Option<&QuestionUpload>, max_size: usize) -> Result<()> {
    let Some(upload) = upload else {
        return Err(Error::validation("file", "file is required"));
    };

    match upload.content_type.as_deref() {
        Some(PDF_CONTENT_TYPE) => {}
        Some(other) => {
            return Err(Error::validation(
                "file",
                format!("only PDF files are allowed, got '{other}'"),
            ));
        }
        None => {
            return Err(Error::validation(
                "file",
                "file content type is missing, expected application/pdf",
            ));
        }
    }

    if upload.is_empty() {
        return Err(Error::validation("file", "file is empty"));
    }

    if upload.len() > max_size {
        return Err(Error::validation(
            "file",
            format!(
                "file is {} bytes, exceeding the {max_size} byte limit",
                upload.len()
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn complete_form() -> QuestionForm {
        QuestionForm {
            title: Some("Algorithms".to_owned()),
            course_code: Some("CSC301".to_owned()),
            department: Some("Computer Engineering Technology".to_owned()),
            level: Some("ND2".to_owned()),
            semester: Some("First Semester".to_owned()),
            year: Some("2023".to_owned()),
        }
    }

    fn pdf(len: usize) -> QuestionUpload {
        QuestionUpload::new("paper.pdf", Some(PDF_CONTENT_TYPE.to_owned()), vec![b'%'; len])
    }

    #[test]
    fn complete_form_is_valid() -> anyhow::Result<()> {
        let metadata = complete_form().validate()?;
        assert_eq!(metadata.level, Level::Nd2);
        assert_eq!(metadata.semester, Semester::First);
        assert_eq!(metadata.year, 2023);
        Ok(())
    }

    #[test]
    fn text_fields_are_trimmed() -> anyhow::Result<()> {
        let mut form = complete_form();
        form.title = Some("  Algorithms \n".to_owned());
        assert_eq!(form.validate()?.title, "Algorithms");
        Ok(())
    }

    #[test]
    fn missing_year_is_named() {
        let mut form = complete_form();
        form.year = None;
        let error = form.validate().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(error.field(), Some("year"));
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut form = complete_form();
        form.title = Some("   ".to_owned());
        assert_eq!(form.validate().unwrap_err().field(), Some("title"));
    }

    #[test]
    fn year_bounds() {
        assert!(parse_year(Some("1999")).is_err());
        assert!(parse_year(Some("2101")).is_err());
        assert!(parse_year(Some("20x3")).is_err());
        assert_eq!(parse_year(Some(" 2000 ")).ok(), Some(2000));
        assert_eq!(parse_year(Some("2100")).ok(), Some(2100));
    }

    #[test]
    fn unknown_level_is_rejected() {
        let mut form = complete_form();
        form.level = Some("ND3".to_owned());
        assert_eq!(form.validate().unwrap_err().field(), Some("level"));
    }

    #[test]
    fn set_ignores_unknown_fields() {
        let mut form = QuestionForm::default();
        assert!(form.set("year", "2024".to_owned()));
        assert!(!form.set("file_name", "x".to_owned()));
        assert_eq!(form.year.as_deref(), Some("2024"));
    }

    #[test]
    fn upload_checks() {
        assert!(validate_upload(Some(&pdf(10)), 10).is_ok());
        assert!(validate_upload(Some(&pdf(11)), 10).is_err());
        assert!(validate_upload(Some(&pdf(0)), 10).is_err());
        assert!(validate_upload(None, 10).is_err());

        let text = QuestionUpload::new("notes.txt", Some("text/plain".to_owned()), "hello");
        let error = validate_upload(Some(&text), 10).unwrap_err();
        assert_eq!(error.field(), Some("file"));
    }
}
