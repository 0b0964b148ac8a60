//! Repoforge fixture builders
//!
//! Materializes synthetic package repositories for dependency-manager tests:
//! - Library directories with a generated source file and metadata
//! - Version-controlled libraries and successor revisions
//! - Packaged archives, deposited in a repository or installed
//! - Repository blocks that build a package set and generate its index
//!
//! # Example
//!
//! ```no_run
//! use repoforge_build::{Dispatch, Forge};
//! use repoforge_config::ForgeConfig;
//!
//! # fn main() -> repoforge_build::BuildResult<()> {
//! let forge = Forge::new(ForgeConfig::with_scratch_root("/tmp/fixtures"));
//! forge.build_repository("/tmp/fixtures/repo", |repo| {
//!     repo.build_gem("alpha", ["1.0", "1.1"], |_| Ok(()))?;
//!     repo.build_gem("beta", "1.0", |s| {
//!         s.add_runtime_dependency("alpha", ">= 1.0")?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod builder;
pub mod catalog;
pub mod command;
pub mod error;
pub mod files;
pub mod forge;
mod git;
pub mod options;
mod packaged;
pub mod repository;
pub mod vcs;

pub use archive::{ArchiveTool, TarArchiver};
pub use builder::{BuildEnv, BuildOutcome, BuilderKind, PackageBuilder};
pub use catalog::{build_second_repository, build_standard_repository};
pub use error::{BuildError, BuildResult};
pub use files::FileMap;
pub use forge::{unconfigured, Dispatch, Forge};
pub use options::{BuildOptions, Versions};
pub use repository::{copy_repository, RepositoryScope, PACKAGES_DIR};
pub use vcs::{GitCli, VersionControl};
