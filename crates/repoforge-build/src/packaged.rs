//! Archive builds

use crate::archive::move_file;
use crate::builder::{BuildEnv, BuildOutcome, PackageBuilder};
use crate::error::{BuildError, BuildResult};
use crate::options::BuildOptions;
use std::fs;
use std::path::Path;

/// Stage the package privately, package it, then deposit the artifact in the
/// destination directory or install it.
///
/// The staging directory is `<scratch>/.tmp/<full_name>` regardless of
/// the destination, and the metadata description is always staged since the
/// archive needs it.
pub(crate) fn build(
    mut builder: PackageBuilder,
    env: &BuildEnv<'_>,
    options: &BuildOptions,
) -> BuildResult<BuildOutcome> {
    let staging = env.config.staging_dir().join(builder.spec().full_name());
    builder.materialize_into(&staging, options.no_default, true)?;

    let destination = options
        .path
        .clone()
        .or_else(|| env.default_root.map(Path::to_path_buf))
        .unwrap_or_else(|| env.config.default_archive_dir());
    fs::create_dir_all(&destination).map_err(|e| BuildError::io(&destination, e))?;

    let artifact = env.archiver.build_archive(builder.spec(), &staging)?;

    let placed = if options.to_system {
        env.archiver.install_ignoring_dependencies(&artifact)?
    } else {
        let file_name = artifact.file_name().ok_or_else(|| {
            BuildError::Archive(format!("artifact path has no file name: {}", artifact.display()))
        })?;
        let target = destination.join(file_name);
        move_file(&artifact, &target)?;
        target
    };

    tracing::debug!(
        package = %builder.spec().full_name(),
        artifact = %placed.display(),
        installed = options.to_system,
        "archive placed"
    );
    Ok(builder.finish(destination, Some(placed)))
}
