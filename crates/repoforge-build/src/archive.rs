//! Archive adapter: packaging staged files and installing artifacts

use crate::error::{BuildError, BuildResult};
use repoforge_config::ForgeConfig;
use repoforge_package::archive::{read_archive_metadata, unpack_data, write_archive};
use repoforge_package::spec::METADATA_EXTENSION;
use repoforge_package::PackageSpec;
use std::fs;
use std::path::{Path, PathBuf};

/// Packaging operations used by archive builds
pub trait ArchiveTool {
    /// Package `spec` from files staged in `staged_dir`. The artifact is
    /// written inside `staged_dir` and its path returned.
    fn build_archive(&self, spec: &PackageSpec, staged_dir: &Path) -> BuildResult<PathBuf>;

    /// Install an artifact without looking at its dependencies. Returns the
    /// installed package directory.
    fn install_ignoring_dependencies(&self, artifact: &Path) -> BuildResult<PathBuf>;
}

/// Native tar/gzip packager
#[derive(Debug, Clone)]
pub struct TarArchiver {
    extension: String,
    install_root: PathBuf,
}

impl TarArchiver {
    pub fn new(extension: impl Into<String>, install_root: impl Into<PathBuf>) -> Self {
        Self {
            extension: extension.into(),
            install_root: install_root.into(),
        }
    }

    pub fn from_config(config: &ForgeConfig) -> Self {
        Self::new(config.layout.archive_extension.clone(), config.install_root())
    }

    /// `<full_name>.<extension>`
    pub fn artifact_name(&self, spec: &PackageSpec) -> String {
        format!("{}.{}", spec.full_name(), self.extension)
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }
}

impl ArchiveTool for TarArchiver {
    fn build_archive(&self, spec: &PackageSpec, staged_dir: &Path) -> BuildResult<PathBuf> {
        let artifact = staged_dir.join(self.artifact_name(spec));
        write_archive(spec, staged_dir, &artifact)?;
        Ok(artifact)
    }

    fn install_ignoring_dependencies(&self, artifact: &Path) -> BuildResult<PathBuf> {
        let spec = read_archive_metadata(artifact)?;
        let full_name = spec.full_name();

        let package_dir = self.install_root.join("gems").join(&full_name);
        unpack_data(artifact, &package_dir)?;

        let specifications = self.install_root.join("specifications");
        fs::create_dir_all(&specifications).map_err(|e| BuildError::io(&specifications, e))?;
        let spec_file = specifications.join(format!("{}.{}", full_name, METADATA_EXTENSION));
        fs::write(&spec_file, spec.to_metadata()?).map_err(|e| BuildError::io(&spec_file, e))?;

        tracing::debug!(
            package = %full_name,
            dir = %package_dir.display(),
            "installed archive, dependencies ignored"
        );
        Ok(package_dir)
    }
}

/// Move `from` to `to`, copying when a rename crosses filesystems
pub fn move_file(from: &Path, to: &Path) -> BuildResult<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    fs::copy(from, to).map_err(|e| BuildError::io(to, e))?;
    fs::remove_file(from).map_err(|e| BuildError::io(from, e))?;
    Ok(())
}
