//! Repository blocks
//!
//! A repository is a root directory holding a `gems` folder of packaged
//! archives and materialized packages, plus the index files generated over
//! them. Builds issued through a [`RepositoryScope`] land in that folder
//! unless they name their own destination, and are registered with the
//! index generated when the block completes.

use crate::builder::{BuildOutcome, BuilderKind, PackageBuilder};
use crate::error::{BuildError, BuildResult};
use crate::forge::{Dispatch, Forge};
use crate::options::{BuildOptions, Versions};
use repoforge_package::Index;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Packages folder inside a repository root
pub const PACKAGES_DIR: &str = "gems";

/// Build context of one repository block
pub struct RepositoryScope<'f> {
    forge: &'f Forge,
    root: PathBuf,
    packages_dir: PathBuf,
    entries: Index,
}

impl<'f> RepositoryScope<'f> {
    fn new(forge: &'f Forge, root: &Path) -> Self {
        Self {
            forge,
            root: root.to_path_buf(),
            packages_dir: root.join(PACKAGES_DIR),
            entries: Index::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Default destination of every build in this block
    pub fn packages_dir(&self) -> &Path {
        &self.packages_dir
    }

    /// Specs built so far in this block
    pub fn entries(&self) -> &Index {
        &self.entries
    }

    pub fn config(&self) -> &repoforge_config::ForgeConfig {
        self.forge.config()
    }
}

impl Dispatch for RepositoryScope<'_> {
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
        let outcomes = self.forge.build_versions(
            kind,
            name,
            &versions.into(),
            &options,
            Some(self.packages_dir.as_path()),
            configure,
        )?;

        for outcome in &outcomes {
            self.entries.add_entry(outcome.spec.clone());
        }
        Ok(outcomes)
    }
}

impl Forge {
    /// Create the repository at `root` unless it already exists.
    ///
    /// Returns `None` without running `configure` when `root` is already a
    /// directory, so fixtures shared across tests are built once.
    pub fn build_repository<F>(&self, root: impl AsRef<Path>, configure: F) -> BuildResult<Option<Index>>
    where
        F: FnOnce(&mut RepositoryScope<'_>) -> BuildResult<()>,
    {
        let root = root.as_ref();
        if root.is_dir() {
            tracing::debug!(root = %root.display(), "repository exists, skipping");
            return Ok(None);
        }
        self.update_repository(root, configure).map(Some)
    }

    /// Run `configure` against the repository at `root`, creating it if
    /// needed, then generate the index once over the whole root.
    ///
    /// A failure inside `configure` skips index generation; packages already
    /// built stay on disk.
    pub fn update_repository<F>(&self, root: impl AsRef<Path>, configure: F) -> BuildResult<Index>
    where
        F: FnOnce(&mut RepositoryScope<'_>) -> BuildResult<()>,
    {
        let root = root.as_ref();
        let mut scope = RepositoryScope::new(self, root);
        fs::create_dir_all(scope.packages_dir()).map_err(|e| BuildError::io(scope.packages_dir(), e))?;

        configure(&mut scope)?;

        let index = self.indexer.generate(root, &scope.entries)?;
        tracing::debug!(root = %root.display(), specs = index.len(), "repository updated");
        Ok(index)
    }
}

/// Copy a repository tree, e.g. to derive a second repository from the
/// first before updating it
pub fn copy_repository(source: &Path, dest: &Path) -> BuildResult<()> {
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            BuildError::io(path, e.into())
        })?;

        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| BuildError::io(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| BuildError::io(&target, e))?;
        }
    }

    Ok(())
}
