//! Standard fixture repositories
//!
//! A shared package set covering the situations resolver and installer
//! tests keep needing: executables, dependency chains, conflicting pins,
//! missing dependencies, platform variants, prereleases, development-only
//! dependencies and native extensions.

use crate::error::BuildResult;
use crate::forge::{unconfigured, Dispatch, Forge};
use crate::options::BuildOptions;
use crate::repository::{copy_repository, RepositoryScope};
use crate::BuilderKind;
use repoforge_package::Index;
use std::fs;

/// Build the first standard repository at `config.repository_root(1)`.
/// Does nothing when it already exists.
pub fn build_standard_repository(forge: &Forge) -> BuildResult<Option<Index>> {
    let root = forge.config().repository_root(1);
    forge.build_repository(&root, standard_packages)
}

/// Recreate the second standard repository as a copy of the first, then add
/// `rack 1.2` and whatever `configure` builds.
pub fn build_second_repository<F>(forge: &Forge, configure: F) -> BuildResult<Index>
where
    F: FnOnce(&mut RepositoryScope<'_>) -> BuildResult<()>,
{
    build_standard_repository(forge)?;

    let first = forge.config().repository_root(1);
    let second = forge.config().repository_root(2);
    if second.exists() {
        fs::remove_dir_all(&second).map_err(|e| crate::BuildError::io(&second, e))?;
    }
    copy_repository(&first, &second)?;

    forge.update_repository(&second, |repo| {
        repo.build_gem("rack", "1.2", |s| {
            s.executables(["rackup"]);
            Ok(())
        })?;
        configure(repo)
    })
}

fn standard_packages(repo: &mut RepositoryScope<'_>) -> BuildResult<()> {
    repo.build_gem("rake", "0.8.7", |s| {
        s.executables(["rake"]);
        Ok(())
    })?;
    repo.build_gem("rack", ["0.9.1", "1.0.0"], |s| {
        s.executables(["rackup"]);
        Ok(())
    })?;
    repo.build_gem("rails", "2.3.2", |s| {
        s.executables(["rails"]);
        s.dependencies(|deps| {
            deps.runtime("rake", "")?
                .runtime("actionpack", "2.3.2")?
                .runtime("activerecord", "2.3.2")?
                .runtime("actionmailer", "2.3.2")?
                .runtime("activeresource", "2.3.2")?;
            Ok(())
        })?;
        Ok(())
    })?;

    for (name, versions) in [
        ("actionpack", vec!["2.3.2"]),
        ("activerecord", vec!["2.3.1", "2.3.2"]),
        ("actionmailer", vec!["2.3.2"]),
        ("activeresource", vec!["2.3.2"]),
    ] {
        repo.build_gem(name, versions, |s| {
            s.add_runtime_dependency("activesupport", "2.3.2")?;
            Ok(())
        })?;
    }
    repo.build_gem("activesupport", ["1.2.3", "2.3.2", "2.3.5"], unconfigured)?;

    repo.build_gem("activemerchant", "1.0", |s| {
        s.add_runtime_dependency("activesupport", ">= 2.0.0")?;
        Ok(())
    })?;
    repo.build_gem("rails_fail", "1.0", |s| {
        s.add_runtime_dependency("activesupport", "= 1.2.3")?;
        Ok(())
    })?;
    repo.build_gem("missing_dep", "1.0", |s| {
        s.add_runtime_dependency("not_here", "")?;
        Ok(())
    })?;

    repo.build(BuilderKind::Gem, "rspec", "1.2.7", BuildOptions::new().no_default(), |s| {
        s.write("lib/spec.rb", "SPEC = '1.2.7'");
        Ok(())
    })?;
    repo.build(BuilderKind::Gem, "rack-test", "1.0", BuildOptions::new().no_default(), |s| {
        s.write("lib/rack/test.rb", "RACK_TEST = '1.0'");
        Ok(())
    })?;

    for (tag, constant) in [("java", "1.0.0 JAVA"), ("ruby", "1.0.0 RUBY")] {
        repo.build_gem("platform_specific", "1.0", |s| {
            s.platform(tag)?;
            s.write(
                "lib/platform_specific.rb",
                format!("PLATFORM_SPECIFIC = '{}'", constant),
            );
            Ok(())
        })?;
    }
    repo.build_gem("only_java", "1.0", |s| {
        s.platform("java")?;
        Ok(())
    })?;

    repo.build_gem("very-simple", "1.0", unconfigured)?;
    repo.build_gem("very-simple-prerelease", "1.0.pre", unconfigured)?;
    repo.build_gem("with_development_dependency", "1.0", |s| {
        s.add_development_dependency("activesupport", "= 2.3.5")?;
        Ok(())
    })?;
    repo.build_gem("very_simple_binary", "1.0", |s| {
        s.native_extension();
        Ok(())
    })?;

    Ok(())
}

