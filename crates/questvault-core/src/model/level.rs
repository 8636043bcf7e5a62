//! Study level enumeration.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Academic level a past question paper belongs to.
///
/// Serialized with the upper-case labels students see (`ND1`, `HND2`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[strum(ascii_case_insensitive)]
pub enum Level {
    /// National Diploma, first year.
    #[serde(rename = "ND1")]
    #[strum(serialize = "ND1")]
    Nd1,

    /// National Diploma, second year.
    #[serde(rename = "ND2")]
    #[strum(serialize = "ND2")]
    Nd2,

    /// Higher National Diploma, first year.
    #[serde(rename = "HND1")]
    #[strum(serialize = "HND1")]
    Hnd1,

    /// Higher National Diploma, second year.
    #[serde(rename = "HND2")]
    #[strum(serialize = "HND2")]
    Hnd2,
}

impl Level {
    /// Returns the wire label of this level.
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns `true` for the Higher National Diploma levels.
    #[inline]
    pub fn is_higher_national(self) -> bool {
        matches!(self, Self::Hnd1 | Self::Hnd2)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!(Level::from_str("ND2").ok(), Some(Level::Nd2));
        assert_eq!(Level::from_str("hnd1").ok(), Some(Level::Hnd1));
        assert!(Level::from_str("ND3").is_err());
    }

    #[test]
    fn display_matches_serde() -> anyhow::Result<()> {
        for level in Level::iter() {
            let json = serde_json::to_string(&level)?;
            assert_eq!(json, format!("\"{level}\""));
        }
        Ok(())
    }
}
