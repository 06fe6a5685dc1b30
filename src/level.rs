use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

/// OPIc proficiency levels, declared from least to most proficient so the
/// derived ordering is the rubric ordering.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    #[strum(serialize = "NL")]
    Nl,
    #[strum(serialize = "NM")]
    Nm,
    #[strum(serialize = "NH")]
    Nh,
    #[strum(serialize = "IL")]
    Il,
    #[strum(serialize = "IM1")]
    Im1,
    #[strum(serialize = "IM2")]
    Im2,
    #[strum(serialize = "IM3")]
    Im3,
    #[strum(serialize = "IH")]
    Ih,
    #[strum(serialize = "AL")]
    Al,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Band {
    #[strum(serialize = "novice")]
    Novice,
    #[strum(serialize = "intermediate")]
    Intermediate,
    #[strum(serialize = "advanced")]
    Advanced,
}

impl Level {
    pub const LOWEST: Level = Level::Nl;
    pub const HIGHEST: Level = Level::Al;

    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn band(self) -> Band {
        match self {
            Self::Nl | Self::Nm | Self::Nh => Band::Novice,
            Self::Il | Self::Im1 | Self::Im2 | Self::Im3 => Band::Intermediate,
            Self::Ih | Self::Al => Band::Advanced,
        }
    }

    pub fn outranks(self, other: Level) -> bool {
        self.rank() > other.rank()
    }

    pub fn code(self) -> &'static str {
        self.into()
    }

    pub fn all_codes() -> Vec<&'static str> {
        Self::iter().map(|l| l.into()).collect()
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::LOWEST
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown level '{}' (expected one of {})",
            self.0,
            Level::all_codes().join(", ")
        )
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::iter()
            .find(|l| l.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}
