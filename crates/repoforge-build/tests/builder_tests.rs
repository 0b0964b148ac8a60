//! Integration tests for library and archive builds

mod common;

use common::{list_files, Harness};
use pretty_assertions::assert_eq;
use repoforge_build::{unconfigured, BuildError, BuildOptions, BuilderKind, Dispatch};
use repoforge_package::archive::{read_archive_metadata, verify_archive};
use repoforge_package::{
    parse_bindings, DependencyDeclaration, DependencyKind, PackageError, PackageSpec,
};
use rstest::rstest;
use std::fs;

// ============================================================================
// Library builds
// ============================================================================

#[test]
fn test_lib_build_writes_default_file_and_metadata() {
    let mut h = Harness::new();
    let outcomes = h.forge.build_lib("foo", "1.0", unconfigured).unwrap();

    assert_eq!(outcomes.len(), 1);
    let dir = h.path("libs/foo-1.0");
    assert_eq!(outcomes[0].path, dir);
    assert_eq!(list_files(&dir), vec!["foo.gemspec", "lib/foo.rb"]);
    assert_eq!(
        fs::read_to_string(dir.join("lib/foo.rb")).unwrap(),
        "FOO = '1.0'\n"
    );
}

#[test]
fn test_lib_build_metadata_lists_every_file() {
    let mut h = Harness::new();
    h.forge
        .build_lib("rack", "1.0.0", |s| {
            s.executables(["rackup"]);
            Ok(())
        })
        .unwrap();

    let dir = h.path("libs/rack-1.0.0");
    let spec = PackageSpec::from_file(&dir.join("rack.gemspec")).unwrap();
    assert_eq!(spec.files, list_files(&dir));
    assert_eq!(
        fs::read_to_string(dir.join("bin/rackup")).unwrap(),
        "require 'rack' ; puts RACK\n"
    );
}

#[test]
fn test_lib_build_no_default_and_no_metadata_writes_nothing() {
    let mut h = Harness::new();
    let dest = h.path("custom/empty");
    let options = BuildOptions::new().at(&dest).no_default().without_gemspec();

    h.forge
        .build(BuilderKind::Lib, "foo", "1.0", options, unconfigured)
        .unwrap();

    assert!(dest.is_dir());
    assert!(list_files(&dest).is_empty());
}

#[test]
fn test_explicit_file_wins_over_default() {
    let mut h = Harness::new();
    h.forge
        .build_lib("foo", "1.0", |s| {
            s.write("lib/foo.rb", "FOO = 'custom'");
            Ok(())
        })
        .unwrap();

    let source = fs::read_to_string(h.path("libs/foo-1.0/lib/foo.rb")).unwrap();
    assert_eq!(source, "FOO = 'custom'\n");
}

#[test]
fn test_versions_build_in_order_with_fresh_builders() {
    let mut h = Harness::new();
    let mut seen = Vec::new();

    let outcomes = h
        .forge
        .build_lib("activesupport", ["2.3.5", "1.2.3"], |s| {
            seen.push(s.spec().version.to_string());
            assert!(s.files().is_empty());
            s.write("extra.txt", "x");
            Ok(())
        })
        .unwrap();

    assert_eq!(seen, vec!["2.3.5", "1.2.3"]);
    assert_eq!(outcomes[1].path, h.path("libs/activesupport-1.2.3"));
}

#[test]
fn test_configuration_failure_reports_version() {
    let mut h = Harness::new();
    let err = h
        .forge
        .build_lib("alpha", ["1.0", "1.1"], |s| {
            if s.spec().version.as_str() == "1.1" {
                s.platform("not a platform")?;
            }
            Ok(())
        })
        .unwrap_err();

    match &err {
        BuildError::VersionFailed { name, version, .. } => {
            assert_eq!(name, "alpha");
            assert_eq!(version, "1.1");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(matches!(err.root_cause(), BuildError::Package(_)));
    // earlier versions stay on disk
    assert!(h.path("libs/alpha-1.0/lib/alpha.rb").is_file());
}

#[test]
fn test_write_failure_is_io_error() {
    let mut h = Harness::new();
    let blocker = h.path("blocker");
    fs::write(&blocker, "").unwrap();

    let err = h
        .forge
        .build(
            BuilderKind::Lib,
            "foo",
            "1.0",
            BuildOptions::new().at(&blocker),
            unconfigured,
        )
        .unwrap_err();
    assert!(matches!(err.root_cause(), BuildError::IoError { .. }));
}

#[test]
fn test_name_with_parent_step_writes_nothing() {
    let mut h = Harness::new();
    let err = h.forge.build_lib("../escape", "1.0", unconfigured).unwrap_err();

    assert!(matches!(
        err.root_cause(),
        BuildError::Package(PackageError::InvalidName(_))
    ));
    assert!(!h.path("escape-1.0").exists());
    assert!(!h.path("libs").exists());
}

#[test]
fn test_alpha_versions_with_beta_dependency() {
    let mut h = Harness::new();
    let outcomes = h
        .forge
        .build_lib("alpha", ["1.0", "1.1"], |s| {
            s.add_runtime_dependency("beta", ">= 2.0")?;
            Ok(())
        })
        .unwrap();

    let expected = DependencyDeclaration::runtime("beta", ">=2.0").unwrap();
    for (outcome, version) in outcomes.iter().zip(["1.0", "1.1"]) {
        assert_eq!(outcome.spec.name, "alpha");
        assert_eq!(outcome.spec.version.as_str(), version);
        assert_eq!(outcome.spec.dependencies, vec![expected.clone()]);
        assert_eq!(expected.kind, DependencyKind::Runtime);

        let dir = h.path(&format!("libs/alpha-{}", version));
        assert_eq!(outcome.path, dir);
        let bindings = parse_bindings(&fs::read_to_string(dir.join("lib/alpha.rb")).unwrap());
        assert_eq!(bindings.get("ALPHA").map(String::as_str), Some(version));
    }
}

#[test]
fn test_metadata_file_reconstructs_spec() {
    let mut h = Harness::new();
    let outcomes = h
        .forge
        .build_lib("rails", "2.3.2", |s| {
            s.executables(["rails"]);
            s.platform("java")?;
            s.summary("full stack");
            s.dependencies(|deps| {
                deps.runtime("rake", "")?
                    .runtime("actionpack", "2.3.2")?
                    .development("rspec", "~> 1.2")?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    let dir = h.path("libs/rails-2.3.2-java");
    let parsed = PackageSpec::from_file(&dir.join("rails.gemspec")).unwrap();
    assert_eq!(parsed, outcomes[0].spec);
    assert_eq!(parsed.development_dependencies().count(), 1);
}

// ============================================================================
// Archive builds
// ============================================================================

#[test]
fn test_gem_build_deposits_artifact() {
    let mut h = Harness::new();
    let outcomes = h
        .forge
        .build_gem("rack", "1.0.0", |s| {
            s.add_runtime_dependency("not_here", ">= 1")?;
            Ok(())
        })
        .unwrap();

    let artifact = h.path("repo1/gems/rack-1.0.0.gem");
    assert_eq!(outcomes[0].path, h.path("repo1/gems"));
    assert_eq!(outcomes[0].artifact.as_deref(), Some(artifact.as_path()));
    assert!(verify_archive(&artifact).unwrap());

    let spec = read_archive_metadata(&artifact).unwrap();
    assert_eq!(spec.runtime_dependencies().count(), 1);
    assert!(spec.files.contains(&"lib/rack.rb".to_string()));

    // staged copy remains, the artifact does not
    let staged = h.path(".tmp/rack-1.0.0");
    assert!(staged.join("lib/rack.rb").is_file());
    assert!(!staged.join("rack-1.0.0.gem").exists());
}

#[test]
fn test_gem_build_to_explicit_path() {
    let mut h = Harness::new();
    let dest = h.path("elsewhere");
    h.forge
        .build(
            BuilderKind::Gem,
            "foo",
            "1.0",
            BuildOptions::new().at(&dest),
            unconfigured,
        )
        .unwrap();

    assert_eq!(list_files(&dest), vec!["foo-1.0.gem"]);
    assert!(!h.path("repo1").exists());
}

#[test]
fn test_gem_build_to_system_installs_despite_missing_dependency() {
    let mut h = Harness::new();
    let outcomes = h
        .forge
        .build(
            BuilderKind::Gem,
            "missing_dep",
            "1.0",
            BuildOptions::new().to_system(),
            |s| {
                s.add_runtime_dependency("not_here", "")?;
                Ok(())
            },
        )
        .unwrap();

    let installed = h.path("system/gems/missing_dep-1.0");
    assert_eq!(outcomes[0].artifact.as_deref(), Some(installed.as_path()));
    assert!(installed.join("lib/missing_dep.rb").is_file());
    assert!(h
        .path("system/specifications/missing_dep-1.0.gemspec")
        .is_file());
    assert_eq!(h.archiver.installed.borrow().len(), 1);
    // nothing deposited
    assert!(list_files(&h.path("repo1/gems")).is_empty());
}

#[test]
fn test_gem_build_ignores_gemspec_opt_out() {
    let mut h = Harness::new();
    h.forge
        .build(
            BuilderKind::Gem,
            "foo",
            "1.0",
            BuildOptions::new().without_gemspec(),
            unconfigured,
        )
        .unwrap();

    assert!(h.path(".tmp/foo-1.0/foo.gemspec").is_file());
}

#[rstest]
#[case("java", "only_java-1.0-java.gem")]
#[case("ruby", "only_java-1.0.gem")]
#[case("x86-mingw32", "only_java-1.0-x86-mingw32.gem")]
fn test_platform_variants_name_artifacts(#[case] platform: &str, #[case] artifact: &str) {
    let mut h = Harness::new();
    h.forge
        .build_gem("only_java", "1.0", |s| {
            s.platform(platform)?;
            Ok(())
        })
        .unwrap();

    assert_eq!(list_files(&h.path("repo1/gems")), vec![artifact.to_string()]);
}

#[test]
fn test_native_extension_archive_contents() {
    let mut h = Harness::new();
    h.forge
        .build_gem("very_simple_binary", "1.0", |s| {
            s.native_extension();
            Ok(())
        })
        .unwrap();

    let spec = read_archive_metadata(&h.path("repo1/gems/very_simple_binary-1.0.gem")).unwrap();
    assert_eq!(spec.extensions, vec!["ext/extconf.rb"]);
    assert_eq!(
        spec.files,
        vec![
            "ext/extconf.rb",
            "ext/very_simple_binary.c",
            "lib/very_simple_binary.rb",
            "very_simple_binary.gemspec",
        ]
    );
}

#[test]
fn test_default_binding_parses_back() {
    let mut h = Harness::new();
    h.forge.build_lib("very-simple", "1.0.pre", unconfigured).unwrap();

    let source = fs::read_to_string(h.path("libs/very-simple-1.0.pre/lib/very-simple.rb")).unwrap();
    let bindings = parse_bindings(&source);
    assert_eq!(bindings.get("VERYSIMPLE").map(String::as_str), Some("1.0.pre"));
}
