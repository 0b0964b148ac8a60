//! Version-control adapter

use crate::command;
use crate::error::{BuildError, BuildResult};
use repoforge_config::GitConfig;
use std::path::Path;

/// The version-control operations builders rely on. Failures are fatal and
/// never retried.
pub trait VersionControl {
    /// Create an empty repository at `path`
    fn init(&self, path: &Path) -> BuildResult<()>;

    /// Stage every file in the working tree
    fn stage_all(&self, path: &Path) -> BuildResult<()>;

    /// Commit staged changes as a new revision
    fn commit(&self, path: &Path, message: &str) -> BuildResult<()>;

    /// Identifier of the current head revision
    fn head_reference(&self, path: &Path) -> BuildResult<String>;
}

/// [`VersionControl`] backed by the `git` command line
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    author_name: String,
    author_email: String,
}

impl GitCli {
    pub fn new(config: &GitConfig) -> Self {
        Self {
            program: config.program.clone(),
            author_name: config.author_name.clone(),
            author_email: config.author_email.clone(),
        }
    }

    fn git(&self, path: &Path, args: &[&str]) -> BuildResult<String> {
        // Fixed identity so commits work without any user-level git config
        let envs = [
            ("GIT_AUTHOR_NAME", self.author_name.as_str()),
            ("GIT_AUTHOR_EMAIL", self.author_email.as_str()),
            ("GIT_COMMITTER_NAME", self.author_name.as_str()),
            ("GIT_COMMITTER_EMAIL", self.author_email.as_str()),
        ];
        let output = command::run(&self.program, args, path, &envs)?;
        Ok(output.stdout)
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(&GitConfig::default())
    }
}

impl VersionControl for GitCli {
    fn init(&self, path: &Path) -> BuildResult<()> {
        self.git(path, &["init", "--quiet"])?;
        Ok(())
    }

    fn stage_all(&self, path: &Path) -> BuildResult<()> {
        self.git(path, &["add", "--all", "."])?;
        Ok(())
    }

    fn commit(&self, path: &Path, message: &str) -> BuildResult<()> {
        self.git(
            path,
            &[
                "-c",
                "commit.gpgsign=false",
                "commit",
                "--quiet",
                "--allow-empty",
                "-m",
                message,
            ],
        )?;
        Ok(())
    }

    fn head_reference(&self, path: &Path) -> BuildResult<String> {
        // rev-parse would happily report the head of an enclosing repository
        if !path.join(".git").exists() {
            return Err(BuildError::not_a_repository(path, None));
        }
        let stdout = self.git(path, &["rev-parse", "HEAD"])?;
        Ok(stdout.trim().to_string())
    }
}
