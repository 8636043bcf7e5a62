//! Semester enumeration mirroring the `QUESTION_SEMESTER` type.

use diesel_derive_enum::DbEnum;
use questvault_core::model::Semester;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Database representation of [`Semester`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::QuestionSemester"]
pub enum QuestionSemester {
    #[db_rename = "First Semester"]
    #[serde(rename = "First Semester")]
    #[strum(serialize = "First Semester")]
    First,

    #[db_rename = "Second Semester"]
    #[serde(rename = "Second Semester")]
    #[strum(serialize = "Second Semester")]
    Second,
}

impl From<Semester> for QuestionSemester {
    fn from(semester: Semester) -> Self {
        match semester {
            Semester::First => Self::First,
            Semester::Second => Self::Second,
        }
    }
}

impl From<QuestionSemester> for Semester {
    fn from(semester: QuestionSemester) -> Self {
        match semester {
            QuestionSemester::First => Self::First,
            QuestionSemester::Second => Self::Second,
        }
    }
}
