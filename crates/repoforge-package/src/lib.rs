//! Repoforge package model
//!
//! In-memory description of fixture packages and the repository index built
//! over them:
//! - Package specifications with dependency declarations
//! - Gem-style versions and version requirements
//! - Platform tags
//! - Metadata serialization (TOML) and the packaged archive format
//! - In-memory index and on-disk index generation

pub mod archive;
pub mod deps;
pub mod index;
pub mod indexer;
pub mod platform;
pub mod spec;
pub mod version;

pub use deps::DependencyGraphBuilder;
pub use index::{build_spec, Index, IndexBuilder, SpecKey};
pub use indexer::{load_index, IndexGenerator, SpecsIndexer};
pub use platform::Platform;
pub use spec::{
    constant_name, default_binding, parse_bindings, DependencyDeclaration, DependencyKind,
    PackageSpec,
};
pub use version::{Constraint, Op, PackageVersion, Requirement};

use std::path::PathBuf;

/// Package model errors
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("Invalid version '{input}': {reason}")]
    InvalidVersion { input: String, reason: String },

    #[error("Invalid requirement '{input}': {reason}")]
    InvalidRequirement { input: String, reason: String },

    #[error("Invalid platform '{0}'")]
    InvalidPlatform(String),

    #[error("Invalid package name '{0}'")]
    InvalidName(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Failed to parse metadata: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize metadata: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Index error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed archive {path}: {reason}")]
    MalformedArchive { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PackageError>;
