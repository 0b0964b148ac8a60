//! Blocking invocation of external tools

use crate::error::{BuildError, BuildResult};
use std::path::Path;
use std::process::{Command, Stdio};

/// Captured output of a successful command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program args...` in `cwd` and wait for it.
///
/// There is no timeout. A non-zero exit becomes
/// [`BuildError::CommandFailed`] carrying the raw status and stderr.
pub fn run(
    program: &str,
    args: &[&str],
    cwd: &Path,
    envs: &[(&str, &str)],
) -> BuildResult<CommandOutput> {
    tracing::debug!(program, ?args, cwd = %cwd.display(), "running command");

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .envs(envs.iter().copied())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| BuildError::CommandSpawn {
            program: program.to_string(),
            error: e,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
        return Err(BuildError::CommandFailed {
            program: program.to_string(),
            args: args.join(" "),
            status: output.status.code(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(CommandOutput { stdout, stderr })
}
