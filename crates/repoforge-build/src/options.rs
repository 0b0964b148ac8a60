//! Per-call build options and version lists

use std::path::PathBuf;

/// Options recognized by every builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Destination override
    pub path: Option<PathBuf>,
    /// Suppress the generated default file
    pub no_default: bool,
    /// Write the metadata description file (default true)
    pub gemspec: bool,
    /// Archive builds only: install the artifact instead of depositing it
    pub to_system: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            path: None,
            no_default: false,
            gemspec: true,
            to_system: false,
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build into `path`
    pub fn at(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn no_default(mut self) -> Self {
        self.no_default = true;
        self
    }

    pub fn without_gemspec(mut self) -> Self {
        self.gemspec = false;
        self
    }

    pub fn to_system(mut self) -> Self {
        self.to_system = true;
        self
    }
}

/// Versions to build, in order. Defaults to `1.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versions(Vec<String>);

impl Versions {
    pub const DEFAULT: &'static str = "1.0";

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Versions {
    fn default() -> Self {
        Self(vec![Self::DEFAULT.to_string()])
    }
}

impl From<&str> for Versions {
    fn from(version: &str) -> Self {
        Self(vec![version.to_string()])
    }
}

impl From<String> for Versions {
    fn from(version: String) -> Self {
        Self(vec![version])
    }
}

impl From<&[&str]> for Versions {
    fn from(versions: &[&str]) -> Self {
        Self(versions.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Versions {
    fn from(versions: [&str; N]) -> Self {
        Self(versions.iter().map(|v| v.to_string()).collect())
    }
}

impl From<Vec<&str>> for Versions {
    fn from(versions: Vec<&str>) -> Self {
        Self(versions.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Versions {
    fn from(versions: Vec<String>) -> Self {
        Self(versions)
    }
}
