//! Platform tags

use crate::{PackageError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Platform a package version was built for
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Platform {
    /// Runs anywhere; omitted from full names
    #[default]
    Generic,
    /// Platform specific build such as `java` or `x86-mingw32`
    Specific(String),
}

impl Platform {
    /// Names accepted for the generic platform
    const GENERIC_ALIASES: [&'static str; 3] = ["generic", "any", "ruby"];

    /// Parse a platform tag
    pub fn parse(input: &str) -> Result<Self> {
        let tag = input.trim();
        if tag.is_empty() || Self::GENERIC_ALIASES.contains(&tag) {
            return Ok(Platform::Generic);
        }

        if !tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(PackageError::InvalidPlatform(input.to_string()));
        }

        Ok(Platform::Specific(tag.to_string()))
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Platform::Generic)
    }

    /// Suffix appended to full names, `None` for generic packages
    pub fn suffix(&self) -> Option<&str> {
        match self {
            Platform::Generic => None,
            Platform::Specific(tag) => Some(tag),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Generic => f.write_str("generic"),
            Platform::Specific(tag) => f.write_str(tag),
        }
    }
}

impl FromStr for Platform {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
