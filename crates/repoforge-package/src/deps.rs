//! Dependency declaration DSL

use crate::spec::{DependencyDeclaration, PackageSpec};
use crate::Result;

/// Appends dependency declarations onto a spec
///
/// ```
/// use repoforge_package::{DependencyGraphBuilder, PackageSpec};
///
/// let mut spec = PackageSpec::new("rails", "2.3.2", None).unwrap();
/// DependencyGraphBuilder::run(&mut spec, |deps| {
///     deps.runtime("rake", "")?.runtime("actionpack", "2.3.2")?;
///     Ok(())
/// })
/// .unwrap();
/// assert_eq!(spec.dependencies.len(), 2);
/// ```
pub struct DependencyGraphBuilder<'a> {
    spec: &'a mut PackageSpec,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(spec: &'a mut PackageSpec) -> Self {
        Self { spec }
    }

    /// Run a declaration block against `spec`
    pub fn run<F>(spec: &'a mut PackageSpec, block: F) -> Result<()>
    where
        F: FnOnce(&mut DependencyGraphBuilder<'a>) -> Result<()>,
    {
        let mut builder = Self::new(spec);
        block(&mut builder)
    }

    /// Declare a runtime dependency
    pub fn runtime(&mut self, name: &str, requirement: &str) -> Result<&mut Self> {
        self.spec
            .add_dependency(DependencyDeclaration::runtime(name, requirement)?);
        Ok(self)
    }

    /// Declare a development dependency
    pub fn development(&mut self, name: &str, requirement: &str) -> Result<&mut Self> {
        self.spec
            .add_dependency(DependencyDeclaration::development(name, requirement)?);
        Ok(self)
    }
}
