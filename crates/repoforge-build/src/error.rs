//! Fixture build error types
use repoforge_config::ConfigError;
use repoforge_package::PackageError;
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Failed to run {program}: {error}")]
    CommandSpawn {
        program: String,
        error: std::io::Error,
    },

    #[error("{program} {args} exited with {status:?}: {stderr}")]
    CommandFailed {
        program: String,
        args: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Not a version-controlled repository: {path}")]
    NotARepository {
        path: PathBuf,
        #[source]
        source: Option<Box<BuildError>>,
    },

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("No version of {0} was built")]
    NothingBuilt(String),

    #[error("Failed to build {name} {version}: {source}")]
    VersionFailed {
        name: String,
        version: String,
        #[source]
        source: Box<BuildError>,
    },
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }

    /// Create a repository precondition error
    pub fn not_a_repository(path: impl Into<PathBuf>, source: Option<BuildError>) -> Self {
        Self::NotARepository {
            path: path.into(),
            source: source.map(Box::new),
        }
    }

    /// The innermost error of a failed batch
    pub fn root_cause(&self) -> &BuildError {
        match self {
            Self::VersionFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
