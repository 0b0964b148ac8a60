//! Forge: the configured entry point, and the dispatcher surface

use crate::archive::{ArchiveTool, TarArchiver};
use crate::builder::{BuildEnv, BuildOutcome, BuilderKind, PackageBuilder};
use crate::error::{BuildError, BuildResult};
use crate::options::{BuildOptions, Versions};
use crate::vcs::{GitCli, VersionControl};
use repoforge_config::{ConfigLoader, ForgeConfig};
use repoforge_package::{IndexGenerator, SpecsIndexer};
use std::path::Path;

/// Configuration plus the external collaborators builders drive.
///
/// The collaborators default to the `git` command line, the native tar
/// packager and the JSON index writer; tests swap in recording fakes.
pub struct Forge {
    config: ForgeConfig,
    pub(crate) vcs: Box<dyn VersionControl>,
    pub(crate) archiver: Box<dyn ArchiveTool>,
    pub(crate) indexer: Box<dyn IndexGenerator>,
}

impl Forge {
    pub fn new(config: ForgeConfig) -> Self {
        let vcs = GitCli::new(&config.git);
        let archiver = TarArchiver::from_config(&config);
        let indexer = SpecsIndexer::new(config.layout.archive_extension.clone());

        Self {
            config,
            vcs: Box::new(vcs),
            archiver: Box::new(archiver),
            indexer: Box::new(indexer),
        }
    }

    /// Forge over configuration loaded from files and the environment
    pub fn from_env() -> BuildResult<Self> {
        Ok(Self::new(ConfigLoader::new().load()?))
    }

    pub fn with_version_control(mut self, vcs: impl VersionControl + 'static) -> Self {
        self.vcs = Box::new(vcs);
        self
    }

    pub fn with_archiver(mut self, archiver: impl ArchiveTool + 'static) -> Self {
        self.archiver = Box::new(archiver);
        self
    }

    pub fn with_indexer(mut self, indexer: impl IndexGenerator + 'static) -> Self {
        self.indexer = Box::new(indexer);
        self
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    fn env<'a>(&'a self, default_root: Option<&'a Path>) -> BuildEnv<'a> {
        BuildEnv {
            config: &self.config,
            vcs: self.vcs.as_ref(),
            archiver: self.archiver.as_ref(),
            default_root,
        }
    }

    /// Build every version in order, running `configure` once per version
    /// on a fresh builder. The batch stops at the first failure; versions
    /// already built stay on disk.
    pub fn build_versions<F>(
        &self,
        kind: BuilderKind,
        name: &str,
        versions: &Versions,
        options: &BuildOptions,
        default_root: Option<&Path>,
        mut configure: F,
    ) -> BuildResult<Vec<BuildOutcome>>
    where
        F: FnMut(&mut PackageBuilder) -> BuildResult<()>,
    {
        let env = self.env(default_root);
        let mut outcomes = Vec::with_capacity(versions.len());

        for version in versions.iter() {
            let outcome = PackageBuilder::new(name, version, &self.config.layout)
                .and_then(|mut builder| {
                    configure(&mut builder)?;
                    builder.materialize(kind, &env, options)
                })
                .map_err(|e| BuildError::VersionFailed {
                    name: name.to_string(),
                    version: version.to_string(),
                    source: Box::new(e),
                })?;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

/// Build packages by kind, name and version list.
///
/// Implemented by [`Forge`] for standalone builds and by
/// [`RepositoryScope`](crate::RepositoryScope) for builds that land in a
/// repository and feed its index.
pub trait Dispatch {
    fn build<V, F>(
        &mut self,
        kind: BuilderKind,
        name: &str,
        versions: V,
        options: BuildOptions,
        configure: F,
    ) -> BuildResult<Vec<BuildOutcome>>
    where
        V: Into<Versions>,
        F: FnMut(&mut PackageBuilder) -> BuildResult<()>;

    fn build_lib<V, F>(&mut self, name: &str, versions: V, configure: F) -> BuildResult<Vec<BuildOutcome>>
    where
        V: Into<Versions>,
        F: FnMut(&mut PackageBuilder) -> BuildResult<()>,
    {
        self.build(BuilderKind::Lib, name, versions, BuildOptions::default(), configure)
    }

    fn build_gem<V, F>(&mut self, name: &str, versions: V, configure: F) -> BuildResult<Vec<BuildOutcome>>
    where
        V: Into<Versions>,
        F: FnMut(&mut PackageBuilder) -> BuildResult<()>,
    {
        self.build(BuilderKind::Gem, name, versions, BuildOptions::default(), configure)
    }

    fn build_git<F>(&mut self, name: &str, version: &str, configure: F) -> BuildResult<BuildOutcome>
    where
        F: FnMut(&mut PackageBuilder) -> BuildResult<()>,
    {
        let outcomes = self.build(BuilderKind::Git, name, version, BuildOptions::default(), configure)?;
        single(name, outcomes)
    }

    fn update_git<F>(
        &mut self,
        name: &str,
        version: &str,
        options: BuildOptions,
        configure: F,
    ) -> BuildResult<BuildOutcome>
    where
        F: FnMut(&mut PackageBuilder) -> BuildResult<()>,
    {
        let outcomes = self.build(BuilderKind::GitUpdate, name, version, options, configure)?;
        single(name, outcomes)
    }
}

impl Dispatch for Forge {
    fn build<V, F>(
        &mut self,
        kind: BuilderKind,
        name: &str,
        versions: V,
        options: BuildOptions,
        configure: F,
    ) -> BuildResult<Vec<BuildOutcome>>
    where
        V: Into<Versions>,
        F: FnMut(&mut PackageBuilder) -> BuildResult<()>,
    {
        self.build_versions(kind, name, &versions.into(), &options, None, configure)
    }
}

/// No-op configuration block
pub fn unconfigured(_: &mut PackageBuilder) -> BuildResult<()> {
    Ok(())
}

fn single(name: &str, outcomes: Vec<BuildOutcome>) -> BuildResult<BuildOutcome> {
    outcomes
        .into_iter()
        .next()
        .ok_or_else(|| BuildError::NothingBuilt(name.to_string()))
}
