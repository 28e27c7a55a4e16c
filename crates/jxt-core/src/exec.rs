//! Run the jextract executable.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Lines of stderr kept in a failure message.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to start {}: {source}", .executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {}:\n{stderr}", .executable.display(), describe_code(.code))]
    Failed {
        executable: PathBuf,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "no exit code (terminated by signal)".to_string(), |c| format!("exit code {c}"))
}

/// Captured result of a successful invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run `executable` with `args` and wait for it to finish.
///
/// # Errors
///
/// [`ExecError::Spawn`] if the process cannot be started,
/// [`ExecError::Failed`] if it exits non-zero. The failure carries the last
/// lines of stderr.
pub async fn run(executable: &Path, args: &[String]) -> Result<ToolOutput, ExecError> {
    info!(executable = %executable.display(), "running jextract");
    debug!(args = ?args, "jextract arguments");

    let output = Command::new(executable)
        .args(args)
        .output()
        .await
        .map_err(|source| ExecError::Spawn {
            executable: executable.to_path_buf(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !stdout.is_empty() {
        debug!(target: "jextract::stdout", "{}", stdout.trim_end());
    }
    if !stderr.is_empty() {
        debug!(target: "jextract::stderr", "{}", stderr.trim_end());
    }

    if !output.status.success() {
        return Err(ExecError::Failed {
            executable: executable.to_path_buf(),
            code: output.status.code(),
            stderr: tail(&stderr, STDERR_TAIL_LINES),
        });
    }

    Ok(ToolOutput {
        status: output.status,
        stdout,
        stderr,
    })
}

fn tail(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}
