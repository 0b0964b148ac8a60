//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::forge::{ConfigFile, ForgeConfig};
use crate::ConfigResult;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "REPOFORGE_CONFIG";
pub const SCRATCH_ROOT_ENV: &str = "REPOFORGE_SCRATCH_ROOT";
pub const GIT_ENV: &str = "REPOFORGE_GIT";
pub const INSTALL_ROOT_ENV: &str = "REPOFORGE_INSTALL_ROOT";

/// Configuration loader
///
/// Precedence, lowest first:
/// 1. Built-in defaults
/// 2. User config (~/.repoforge/config.toml), if it exists
/// 3. File named by `REPOFORGE_CONFIG`
/// 4. Environment variable overrides
pub struct ConfigLoader {
    /// Overrides the user config location
    user_config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            user_config_path: None,
        }
    }

    /// Read the user config from `path` instead of the home directory
    pub fn with_user_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_config_path = Some(path.into());
        self
    }

    /// Load and merge every configuration source
    pub fn load(&self) -> ConfigResult<ForgeConfig> {
        let mut config = ForgeConfig::default();

        if let Some(user) = self.user_config()? {
            config.apply(&user);
        }

        if let Ok(path) = env::var(CONFIG_ENV) {
            config.apply(&ConfigFile::load_from_file(Path::new(&path))?);
        }

        self.apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// User config is optional: a missing file or home directory is not an error
    fn user_config(&self) -> ConfigResult<Option<ConfigFile>> {
        let path = match &self.user_config_path {
            Some(path) => path.clone(),
            None => match ConfigFile::user_config_path() {
                Ok(path) => path,
                Err(_) => return Ok(None),
            },
        };

        if !path.exists() {
            return Ok(None);
        }

        ConfigFile::load_from_file(&path).map(Some)
    }

    /// Apply `REPOFORGE_*` environment overrides
    fn apply_env_overrides(&self, config: &mut ForgeConfig) {
        if let Ok(root) = env::var(SCRATCH_ROOT_ENV) {
            config.scratch_root = PathBuf::from(root);
        }

        if let Ok(program) = env::var(GIT_ENV) {
            config.git.program = program;
        }

        if let Ok(root) = env::var(INSTALL_ROOT_ENV) {
            config.install_root = Some(PathBuf::from(root));
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
