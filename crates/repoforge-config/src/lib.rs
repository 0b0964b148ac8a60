//! Repoforge Configuration
//!
//! Settings shared by every fixture build: where scratch repositories live,
//! which version-control binary to run and with what identity, and the file
//! layout of generated packages.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. User config (~/.repoforge/config.toml)
//! 3. File named by `REPOFORGE_CONFIG`
//! 4. Environment variables (`REPOFORGE_SCRATCH_ROOT`, `REPOFORGE_GIT`, `REPOFORGE_INSTALL_ROOT`)
//!
//! # Example
//!
//! ```no_run
//! use repoforge_config::ConfigLoader;
//!
//! let config = ConfigLoader::new().load().unwrap();
//! println!("{}", config.libs_dir().display());
//! ```

pub mod forge;
pub mod loader;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use forge::{ForgeConfig, GitConfig, LayoutConfig};
pub use loader::ConfigLoader;
