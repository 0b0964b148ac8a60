//! Version-controlled library builds

use crate::builder::{BuildEnv, BuildOutcome, PackageBuilder};
use crate::error::{BuildError, BuildResult};
use crate::options::BuildOptions;
use repoforge_package::constant_name;

/// Materialize the package, then record it as the first revision of a new
/// repository
pub(crate) fn build(
    mut builder: PackageBuilder,
    env: &BuildEnv<'_>,
    options: &BuildOptions,
) -> BuildResult<BuildOutcome> {
    let path = builder.package_dir(env, options);
    builder.materialize_into(&path, options.no_default, options.gemspec)?;

    env.vcs.init(&path)?;
    env.vcs.stage_all(&path)?;
    env.vcs.commit(&path, &env.config.git.initial_message)?;

    tracing::debug!(package = %builder.spec().full_name(), path = %path.display(), "created repository");
    Ok(builder.finish(path, None))
}

/// Commit a successor revision to an existing repository.
///
/// The default files are rewritten with a `<CONST>_PREV_REF` binding holding
/// the head reference observed before the update, so every update changes
/// the tree even when nothing else was declared.
pub(crate) fn update(
    mut builder: PackageBuilder,
    env: &BuildEnv<'_>,
    options: &BuildOptions,
) -> BuildResult<BuildOutcome> {
    let path = builder.package_dir(env, options);
    if !path.is_dir() {
        return Err(BuildError::not_a_repository(&path, None));
    }

    let previous = env.vcs.head_reference(&path).map_err(|e| match e {
        e @ BuildError::NotARepository { .. } => e,
        other => BuildError::not_a_repository(&path, Some(other)),
    })?;

    let constant = constant_name(builder.name());
    let defaults = builder.default_files();
    for (file, content) in defaults.iter() {
        builder.write(
            file,
            format!("{}\n{}_PREV_REF = '{}'", content, constant, previous),
        );
    }

    builder.materialize_into(&path, options.no_default, options.gemspec)?;
    env.vcs.stage_all(&path)?;
    env.vcs.commit(&path, &env.config.git.update_message)?;

    tracing::debug!(
        package = %builder.spec().full_name(),
        previous = %previous,
        "committed update"
    );
    Ok(builder.finish(path, None))
}
