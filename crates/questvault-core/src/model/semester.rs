//! Semester enumeration.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Semester in which the examination was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[strum(ascii_case_insensitive)]
pub enum Semester {
    #[serde(rename = "First Semester")]
    #[strum(serialize = "First Semester")]
    First,

    #[serde(rename = "Second Semester")]
    #[strum(serialize = "Second Semester")]
    Second,
}

impl Semester {
    /// Returns the wire label of this semester.
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
