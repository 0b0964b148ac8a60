//! In-memory package index
//!
//! The index is what a resolver under test queries: every registered spec is
//! addressable by `(name, version, platform)`.

use crate::deps::DependencyGraphBuilder;
use crate::platform::Platform;
use crate::spec::PackageSpec;
use crate::version::{PackageVersion, Requirement};
use crate::Result;
use std::collections::BTreeMap;

/// Identity of a spec within one repository
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecKey {
    pub name: String,
    pub version: PackageVersion,
    pub platform: Platform,
}

impl SpecKey {
    pub fn of(spec: &PackageSpec) -> Self {
        Self {
            name: spec.name.clone(),
            version: spec.version.clone(),
            platform: spec.platform.clone(),
        }
    }
}

/// Package index keyed by spec identity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Index {
    entries: BTreeMap<SpecKey, PackageSpec>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec, replacing any entry with the same identity
    pub fn add_entry(&mut self, spec: PackageSpec) {
        self.entries.insert(SpecKey::of(&spec), spec);
    }

    /// Add every entry of `other`; entries in `other` win
    pub fn merge(&mut self, other: Index) {
        self.entries.extend(other.entries);
    }

    /// Exact lookup
    pub fn find(
        &self,
        name: &str,
        version: &PackageVersion,
        platform: &Platform,
    ) -> Option<&PackageSpec> {
        let key = SpecKey {
            name: name.to_string(),
            version: version.clone(),
            platform: platform.clone(),
        };
        self.entries.get(&key)
    }

    /// Specs named `name` matching `requirement`, optionally restricted to
    /// one platform, in ascending version order
    pub fn search(
        &self,
        name: &str,
        requirement: &Requirement,
        platform: Option<&Platform>,
    ) -> Vec<&PackageSpec> {
        self.entries
            .values()
            .filter(|spec| spec.name == name)
            .filter(|spec| requirement.matches(&spec.version))
            .filter(|spec| platform.map_or(true, |p| &spec.platform == p))
            .collect()
    }

    /// Highest version registered under `name`, any platform
    pub fn latest(&self, name: &str) -> Option<&PackageSpec> {
        self.entries
            .values()
            .filter(|spec| spec.name == name)
            .max_by(|a, b| a.version.cmp(&b.version))
    }

    /// Every version registered under `name`
    pub fn versions_of(&self, name: &str) -> Vec<&PackageVersion> {
        let mut versions: Vec<_> = self
            .entries
            .values()
            .filter(|spec| spec.name == name)
            .map(|spec| &spec.version)
            .collect();
        versions.sort();
        versions.dedup();
        versions
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageSpec> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<PackageSpec> for Index {
    fn from_iter<T: IntoIterator<Item = PackageSpec>>(iter: T) -> Self {
        let mut index = Index::new();
        for spec in iter {
            index.add_entry(spec);
        }
        index
    }
}

/// Build a spec in memory, declaring its dependencies in `block`
pub fn build_spec<F>(name: &str, version: &str, platform: Option<&str>, block: F) -> Result<PackageSpec>
where
    F: FnOnce(&mut DependencyGraphBuilder<'_>) -> Result<()>,
{
    let mut spec = PackageSpec::new(name, version, platform)?;
    DependencyGraphBuilder::run(&mut spec, block)?;
    Ok(spec)
}

/// Builds an [`Index`] without touching the filesystem
///
/// ```
/// use repoforge_package::IndexBuilder;
///
/// let index = IndexBuilder::run(|b| {
///     b.add_spec("rack", "1.0.0", None, |_| Ok(()))?;
///     b.add_spec("rails", "2.3.2", None, |deps| {
///         deps.runtime("rack", ">= 1.0")?;
///         Ok(())
///     })?;
///     Ok(())
/// })
/// .unwrap();
/// assert_eq!(index.len(), 2);
/// ```
pub struct IndexBuilder {
    index: Index,
}

impl IndexBuilder {
    pub fn run<F>(block: F) -> Result<Index>
    where
        F: FnOnce(&mut IndexBuilder) -> Result<()>,
    {
        let mut builder = IndexBuilder {
            index: Index::new(),
        };
        block(&mut builder)?;
        Ok(builder.index)
    }

    pub fn add_spec<F>(
        &mut self,
        name: &str,
        version: &str,
        platform: Option<&str>,
        block: F,
    ) -> Result<&mut Self>
    where
        F: FnOnce(&mut DependencyGraphBuilder<'_>) -> Result<()>,
    {
        self.index.add_entry(build_spec(name, version, platform, block)?);
        Ok(self)
    }
}
