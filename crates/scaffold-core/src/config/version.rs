//! Project configuration version marker.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

/// Maturity stage of a configuration version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Stage {
    Alpha,
    Beta,
    #[default]
    Stable,
}

impl Stage {
    /// Suffix used in the text form; empty for stable.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Alpha => "alpha",
            Stage::Beta => "beta",
            Stage::Stable => "",
        }
    }
}

/// Version of the project configuration schema, e.g. `3-alpha`.
///
/// Ordered by number first, then by stage (alpha < beta < stable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub number: u32,
    pub stage: Stage,
}

impl Version {
    pub const fn new(number: u32, stage: Stage) -> Self {
        Self { number, stage }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Stage::Stable => write!(f, "{}", self.number),
            stage => write!(f, "{}-{}", self.number, stage.as_str()),
        }
    }
}

impl FromStr for Version {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidVersion(s.to_string());

        let (number, stage) = match s.split_once('-') {
            Some((number, "alpha")) => (number, Stage::Alpha),
            Some((number, "beta")) => (number, Stage::Beta),
            Some(_) => return Err(invalid()),
            None => (s, Stage::Stable),
        };

        let number: u32 = number.parse().map_err(|_| invalid())?;
        if number == 0 {
            return Err(invalid());
        }

        Ok(Self { number, stage })
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
