//! Shell command execution for build strategies.
//!
//! Every install/build step runs through [`run_shell`] so stdout and stderr
//! are always captured and attached to the failure that aborts a pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("build command `{command}` exited with {status}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("expected build output directory missing: {0}")]
    MissingOutput(PathBuf),

    #[error("filesystem error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run a shell command in `dir` with the build environment applied.
///
/// A non-zero exit aborts the build with both streams captured.
pub async fn run_shell(
    dir: &Path,
    command: &str,
    env: &BTreeMap<String, String>,
) -> Result<CommandOutput, BuildError> {
    debug!(command, dir = %dir.display(), "running build command");

    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(dir)
        .envs(env)
        .output()
        .await
        .map_err(|source| BuildError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(BuildError::CommandFailed {
            command: command.to_string(),
            status: output.status.to_string(),
            stdout,
            stderr,
        });
    }

    debug!(command, "build command completed");
    if !stderr.is_empty() {
        warn!(command, stderr = %stderr.trim_end(), "build command wrote to stderr");
    }
    Ok(CommandOutput { stdout, stderr })
}

/// Run a best-effort command: failures are logged and swallowed.
///
/// Used for optional post-processing steps (composer install, venv setup,
/// stylesheet compilation) that must not abort a deploy.
pub async fn run_shell_lenient(dir: &Path, command: &str, env: &BTreeMap<String, String>) -> bool {
    match run_shell(dir, command, env).await {
        Ok(_) => true,
        Err(err) => {
            warn!(command, error = %err, "best-effort command failed, continuing");
            false
        }
    }
}
