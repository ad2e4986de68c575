//! Small shared domain enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display language for user-facing text. Vietnamese is the primary locale;
/// English fields fall back to their Vietnamese counterparts when absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Vi,
    En,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown locale `{0}`, expected `vi` or `en`")]
pub struct LocaleParseError(String);

impl FromStr for Locale {
    type Err = LocaleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "vi" => Ok(Self::Vi),
            "en" => Ok(Self::En),
            other => Err(LocaleParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vi => f.write_str("vi"),
            Self::En => f.write_str("en"),
        }
    }
}
