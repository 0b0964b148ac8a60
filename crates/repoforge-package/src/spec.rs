//! Package specification: one version of one package

use crate::platform::Platform;
use crate::version::{PackageVersion, Requirement};
use crate::{PackageError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Extension of the metadata description file written next to sources
pub const METADATA_EXTENSION: &str = "gemspec";

/// Summary given to every fixture package unless overridden
pub const DEFAULT_SUMMARY: &str = "This is just a fake package for testing";

/// Dependency kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Runtime,
    Development,
}

/// A dependency declared by a package
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyDeclaration {
    pub name: String,
    pub requirement: Requirement,
    pub kind: DependencyKind,
}

impl DependencyDeclaration {
    pub fn new(name: impl Into<String>, requirement: Requirement, kind: DependencyKind) -> Self {
        Self {
            name: name.into(),
            requirement,
            kind,
        }
    }

    /// Runtime dependency from a requirement expression
    pub fn runtime(name: impl Into<String>, requirement: &str) -> Result<Self> {
        Ok(Self::new(
            name,
            Requirement::parse(requirement)?,
            DependencyKind::Runtime,
        ))
    }

    /// Development dependency from a requirement expression
    pub fn development(name: impl Into<String>, requirement: &str) -> Result<Self> {
        Ok(Self::new(
            name,
            Requirement::parse(requirement)?,
            DependencyKind::Development,
        ))
    }
}

/// In-memory description of one package version
///
/// Field order matters for the TOML form: the dependency array of tables
/// must come after every plain value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSpec {
    pub name: String,
    pub version: PackageVersion,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub executables: BTreeSet<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default = "default_require_paths", rename = "require-paths")]
    pub require_paths: Vec<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDeclaration>,
}

fn default_require_paths() -> Vec<String> {
    vec!["lib".to_string()]
}

impl PackageSpec {
    /// Create a spec; an absent platform means generic
    pub fn new(name: &str, version: &str, platform: Option<&str>) -> Result<Self> {
        validate_name(name)?;

        let platform = match platform {
            Some(tag) => Platform::parse(tag)?,
            None => Platform::Generic,
        };

        Ok(Self {
            name: name.to_string(),
            version: PackageVersion::parse(version)?,
            platform,
            summary: DEFAULT_SUMMARY.to_string(),
            executables: BTreeSet::new(),
            extensions: Vec::new(),
            require_paths: default_require_paths(),
            files: Vec::new(),
            dependencies: Vec::new(),
        })
    }

    /// `<name>-<version>` with `-<platform>` for platform specific builds
    pub fn full_name(&self) -> String {
        match self.platform.suffix() {
            Some(platform) => format!("{}-{}-{}", self.name, self.version, platform),
            None => format!("{}-{}", self.name, self.version),
        }
    }

    /// Name of the metadata description file (`<name>.gemspec`)
    pub fn metadata_file_name(&self) -> String {
        format!("{}.{}", self.name, METADATA_EXTENSION)
    }

    pub fn add_dependency(&mut self, dependency: DependencyDeclaration) {
        self.dependencies.push(dependency);
    }

    pub fn add_runtime_dependency(&mut self, name: &str, requirement: &str) -> Result<()> {
        self.add_dependency(DependencyDeclaration::runtime(name, requirement)?);
        Ok(())
    }

    pub fn add_development_dependency(&mut self, name: &str, requirement: &str) -> Result<()> {
        self.add_dependency(DependencyDeclaration::development(name, requirement)?);
        Ok(())
    }

    pub fn runtime_dependencies(&self) -> impl Iterator<Item = &DependencyDeclaration> {
        self.dependencies
            .iter()
            .filter(|d| d.kind == DependencyKind::Runtime)
    }

    pub fn development_dependencies(&self) -> impl Iterator<Item = &DependencyDeclaration> {
        self.dependencies
            .iter()
            .filter(|d| d.kind == DependencyKind::Development)
    }

    /// Serialize to the metadata description format
    pub fn to_metadata(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Parse a metadata description
    pub fn from_metadata(content: &str) -> Result<Self> {
        let spec: Self = toml::from_str(content)?;
        validate_name(&spec.name)?;
        Ok(spec)
    }

    /// Load a metadata description file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_metadata(&content)
    }
}

/// Constant generated for a package name: dashes dropped, uppercased
/// (`very-simple` becomes `VERYSIMPLE`).
pub fn constant_name(name: &str) -> String {
    name.replace('-', "").to_uppercase()
}

/// The default file binding for a package version
pub fn default_binding(name: &str, version: &PackageVersion) -> String {
    format!("{} = '{}'", constant_name(name), version)
}

/// Evaluate `NAME = 'value'` bindings in a generated source file.
///
/// Lines that are not simple bindings (requires, prints, blank lines) are
/// skipped. Later bindings of the same name win.
pub fn parse_bindings(source: &str) -> BTreeMap<String, String> {
    let mut bindings = BTreeMap::new();

    for line in source.lines() {
        let Some((lhs, rhs)) = line.split_once('=') else {
            continue;
        };
        let name = lhs.trim();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        {
            continue;
        }

        let value = rhs.trim();
        let unquoted = value
            .strip_prefix('\'')
            .and_then(|v| v.strip_suffix('\''))
            .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')));

        if let Some(value) = unquoted {
            bindings.insert(name.to_string(), value.to_string());
        }
    }

    bindings
}

/// Names end up as path components: same characters as platform tags, no
/// leading dot and no `..`
fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PackageError::MissingField("name".to_string()));
    }

    let allowed = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !allowed || name.starts_with('.') || name.contains("..") {
        return Err(PackageError::InvalidName(name.to_string()));
    }
    Ok(())
}
