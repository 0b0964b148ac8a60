//! Fixture configuration
//!
//! [`ForgeConfig`] is the resolved configuration every builder reads.
//! [`ConfigFile`] is the on-disk form, where every key is optional and only
//! the keys present override what came before.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ForgeConfig {
    /// Root for default library paths, staging areas and repositories
    pub scratch_root: PathBuf,
    /// Where `to_system` archive builds are installed
    pub install_root: Option<PathBuf>,
    pub git: GitConfig,
    pub layout: LayoutConfig,
}

/// Version-control settings
#[derive(Debug, Clone, PartialEq)]
pub struct GitConfig {
    /// Program invoked for version-control operations
    pub program: String,
    pub author_name: String,
    pub author_email: String,
    /// Message of the first commit of a new repository
    pub initial_message: String,
    /// Message of every update commit
    pub update_message: String,
}

/// Layout of generated package files
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub lib_dir: String,
    pub bin_dir: String,
    /// Extension of generated source files, without the dot
    pub source_extension: String,
    /// Extension of packaged archives, without the dot
    pub archive_extension: String,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            scratch_root: std::env::temp_dir().join("repoforge"),
            install_root: None,
            git: GitConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            author_name: "Repoforge".to_string(),
            author_email: "repoforge@example.com".to_string(),
            initial_message: "initial commit".to_string(),
            update_message: "bump".to_string(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            lib_dir: "lib".to_string(),
            bin_dir: "bin".to_string(),
            source_extension: "rb".to_string(),
            archive_extension: "gem".to_string(),
        }
    }
}

impl ForgeConfig {
    /// Defaults rooted at `scratch_root`
    pub fn with_scratch_root(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
            ..Self::default()
        }
    }

    /// Load a config file on top of the defaults
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply(&ConfigFile::load_from_file(path)?);
        config.validate()?;
        Ok(config)
    }

    /// Override every key present in `file`
    pub fn apply(&mut self, file: &ConfigFile) {
        if let Some(root) = &file.scratch_root {
            self.scratch_root = root.clone();
        }
        if let Some(root) = &file.install_root {
            self.install_root = Some(root.clone());
        }

        if let Some(git) = &file.git {
            override_with(&mut self.git.program, &git.program);
            override_with(&mut self.git.author_name, &git.author_name);
            override_with(&mut self.git.author_email, &git.author_email);
            override_with(&mut self.git.initial_message, &git.initial_message);
            override_with(&mut self.git.update_message, &git.update_message);
        }

        if let Some(layout) = &file.layout {
            override_with(&mut self.layout.lib_dir, &layout.lib_dir);
            override_with(&mut self.layout.bin_dir, &layout.bin_dir);
            override_with(&mut self.layout.source_extension, &layout.source_extension);
            override_with(&mut self.layout.archive_extension, &layout.archive_extension);
        }
    }

    /// Validate the resolved configuration
    pub fn validate(&self) -> ConfigResult<()> {
        require_non_empty("git.program", &self.git.program)?;
        require_non_empty("git.initial_message", &self.git.initial_message)?;
        require_non_empty("git.update_message", &self.git.update_message)?;
        require_non_empty("layout.lib_dir", &self.layout.lib_dir)?;
        require_non_empty("layout.bin_dir", &self.layout.bin_dir)?;

        for (field, ext) in [
            ("layout.source_extension", &self.layout.source_extension),
            ("layout.archive_extension", &self.layout.archive_extension),
        ] {
            require_non_empty(field, ext)?;
            if ext.starts_with('.') {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("extension '{}' must not start with a dot", ext),
                });
            }
        }

        Ok(())
    }

    /// Default home of library builds (`<scratch>/libs`)
    pub fn libs_dir(&self) -> PathBuf {
        self.scratch_root.join("libs")
    }

    /// Private staging area of archive builds (`<scratch>/.tmp`)
    pub fn staging_dir(&self) -> PathBuf {
        self.scratch_root.join(".tmp")
    }

    /// Root of the `n`th conventional repository (`<scratch>/repo<n>`)
    pub fn repository_root(&self, n: usize) -> PathBuf {
        self.scratch_root.join(format!("repo{}", n))
    }

    /// Where archives land when no destination is given: the `gems`
    /// folder of the first repository
    pub fn default_archive_dir(&self) -> PathBuf {
        self.repository_root(1).join("gems")
    }

    /// Target of `to_system` installs
    pub fn install_root(&self) -> PathBuf {
        self.install_root
            .clone()
            .unwrap_or_else(|| self.scratch_root.join("system"))
    }
}

fn override_with(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}

fn require_non_empty(field: &str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// On-disk configuration (`config.toml`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "scratch-root")]
    pub scratch_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "install-root")]
    pub install_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct GitSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct LayoutSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_extension: Option<String>,
}

impl ConfigFile {
    /// Load a configuration file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })
    }

    /// User-level config path (~/.repoforge/config.toml)
    pub fn user_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".repoforge").join("config.toml"))
    }
}
