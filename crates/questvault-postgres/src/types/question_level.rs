//! Question level enumeration mirroring the `QUESTION_LEVEL` type.

use diesel_derive_enum::DbEnum;
use questvault_core::model::Level;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Database representation of [`Level`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::QuestionLevel"]
pub enum QuestionLevel {
    #[db_rename = "ND1"]
    #[serde(rename = "ND1")]
    #[strum(serialize = "ND1")]
    Nd1,

    #[db_rename = "ND2"]
    #[serde(rename = "ND2")]
    #[strum(serialize = "ND2")]
    Nd2,

    #[db_rename = "HND1"]
    #[serde(rename = "HND1")]
    #[strum(serialize = "HND1")]
    Hnd1,

    #[db_rename = "HND2"]
    #[serde(rename = "HND2")]
    #[strum(serialize = "HND2")]
    Hnd2,
}

impl From<Level> for QuestionLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Nd1 => Self::Nd1,
            Level::Nd2 => Self::Nd2,
            Level::Hnd1 => Self::Hnd1,
            Level::Hnd2 => Self::Hnd2,
        }
    }
}

impl From<QuestionLevel> for Level {
    fn from(level: QuestionLevel) -> Self {
        match level {
            QuestionLevel::Nd1 => Self::Nd1,
            QuestionLevel::Nd2 => Self::Nd2,
            QuestionLevel::Hnd1 => Self::Hnd1,
            QuestionLevel::Hnd2 => Self::Hnd2,
        }
    }
}
