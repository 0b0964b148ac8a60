//! Configuration loading and precedence tests

use repoforge_config::loader::{CONFIG_ENV, GIT_ENV, INSTALL_ROOT_ENV};
use repoforge_config::{ConfigError, ConfigLoader, ForgeConfig};
use rstest::rstest;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn isolated_loader(dir: &Path) -> ConfigLoader {
    ConfigLoader::new().with_user_config(dir.join("no-user-config.toml"))
}

// ============================================================================
// File Loading Tests
// ============================================================================

#[test]
fn test_load_full_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        temp_dir.path(),
        "forge.toml",
        r#"
scratch-root = "/tmp/fixtures"
install-root = "/tmp/system-gems"

[git]
program = "git"
author-name = "Fixture Bot"
author-email = "bot@example.com"
initial-message = "OMG INITIAL COMMIT"
update-message = "BUMP"

[layout]
lib-dir = "lib"
bin-dir = "exe"
source-extension = "rb"
archive-extension = "gem"
"#,
    );

    let config = ForgeConfig::load_from_file(&path).unwrap();
    assert_eq!(config.scratch_root, PathBuf::from("/tmp/fixtures"));
    assert_eq!(config.install_root(), PathBuf::from("/tmp/system-gems"));
    assert_eq!(config.git.author_name, "Fixture Bot");
    assert_eq!(config.git.initial_message, "OMG INITIAL COMMIT");
    assert_eq!(config.layout.bin_dir, "exe");
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = ForgeConfig::load_from_file(&temp_dir.path().join("missing.toml"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[rstest]
#[case::unclosed_table("[git\nprogram = ")]
#[case::unknown_key("colour = \"blue\"\n")]
#[case::wrong_type("[layout]\nlib-dir = 3\n")]
fn test_load_invalid_toml(#[case] content: &str) {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(temp_dir.path(), "bad.toml", content);
    let result = ForgeConfig::load_from_file(&path);
    assert!(matches!(result, Err(ConfigError::TomlParseError { .. })));
}

#[rstest]
#[case("[layout]\narchive-extension = \".gem\"\n", "layout.archive_extension")]
#[case("[layout]\nsource-extension = \"\"\n", "layout.source_extension")]
#[case("[git]\nprogram = \" \"\n", "git.program")]
fn test_load_rejects_invalid_values(#[case] content: &str, #[case] expected: &str) {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(temp_dir.path(), "bad.toml", content);
    match ForgeConfig::load_from_file(&path) {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, expected),
        other => panic!("expected invalid {}, got {:?}", expected, other),
    }
}

// ============================================================================
// Precedence Tests
// ============================================================================

#[test]
#[serial]
fn test_explicit_file_overrides_user_config() {
    let temp_dir = TempDir::new().unwrap();
    let user = write_config(
        temp_dir.path(),
        "user.toml",
        "[git]\nauthor-name = \"User\"\nupdate-message = \"user bump\"\n",
    );
    let explicit = write_config(
        temp_dir.path(),
        "explicit.toml",
        "[git]\nauthor-name = \"Explicit\"\n",
    );

    env::set_var(CONFIG_ENV, &explicit);
    let config = ConfigLoader::new().with_user_config(&user).load();
    env::remove_var(CONFIG_ENV);

    let config = config.unwrap();
    assert_eq!(config.git.author_name, "Explicit");
    assert_eq!(config.git.update_message, "user bump");
}

#[test]
#[serial]
fn test_env_overrides_everything() {
    let temp_dir = TempDir::new().unwrap();
    let explicit = write_config(
        temp_dir.path(),
        "explicit.toml",
        "install-root = \"/from-file\"\n[git]\nprogram = \"file-git\"\n",
    );

    env::set_var(CONFIG_ENV, &explicit);
    env::set_var(GIT_ENV, "env-git");
    env::set_var(INSTALL_ROOT_ENV, "/from-env");
    let config = isolated_loader(temp_dir.path()).load();
    env::remove_var(CONFIG_ENV);
    env::remove_var(GIT_ENV);
    env::remove_var(INSTALL_ROOT_ENV);

    let config = config.unwrap();
    assert_eq!(config.git.program, "env-git");
    assert_eq!(config.install_root(), PathBuf::from("/from-env"));
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    env::set_var(CONFIG_ENV, temp_dir.path().join("gone.toml"));
    let result = isolated_loader(temp_dir.path()).load();
    env::remove_var(CONFIG_ENV);

    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}
