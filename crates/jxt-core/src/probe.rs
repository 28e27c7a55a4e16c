//! Ask a jextract executable for its version.
//!
//! The tool prints something like
//!
//! ```text
//! jextract 22
//! JDK version 22+35-2369
//! LibClang version clang version 13.0.0
//! ```
//!
//! Only the first line matters: its last whitespace-separated token is the
//! feature release number.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Flag that makes jextract print its version and exit.
pub const VERSION_FLAG: &str = "--version";

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to run {} --version: {source}", .executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} --version exited with {status}: {output:?}", .executable.display())]
    Failed {
        executable: PathBuf,
        status: std::process::ExitStatus,
        output: String,
    },

    #[error("Could not read a jextract version from {output:?}")]
    Unparsable { output: String },
}

/// Parse the tool version from `--version` output.
///
/// ```
/// use jxt_core::probe::parse_version;
///
/// assert_eq!(parse_version("jextract 22\nJDK version 22+35").unwrap(), 22);
/// assert!(parse_version("\njextract 22").is_err());
/// ```
///
/// # Errors
///
/// Returns [`ProbeError::Unparsable`] if the first line is empty or its last
/// token is not an integer.
pub fn parse_version(output: &str) -> Result<u32, ProbeError> {
    output
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().next_back())
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| ProbeError::Unparsable {
            output: output.to_string(),
        })
}

/// Runs `--version` at most once per executable path.
#[derive(Debug, Default)]
pub struct VersionProbe {
    cache: Mutex<HashMap<PathBuf, u32>>,
}

impl VersionProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// The version of the tool at `executable`.
    ///
    /// Stdout is parsed; if it is empty, stderr is parsed instead since some
    /// releases print the banner there. Output of a run that exits non-zero
    /// is never parsed.
    pub async fn probe(&self, executable: &Path) -> Result<u32, ProbeError> {
        if let Some(version) = self.cached(executable) {
            return Ok(version);
        }

        let output = Command::new(executable)
            .arg(VERSION_FLAG)
            .output()
            .await
            .map_err(|source| ProbeError::Spawn {
                executable: executable.to_path_buf(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = if stdout.trim().is_empty() {
            String::from_utf8_lossy(&output.stderr)
        } else {
            stdout
        };

        if !output.status.success() {
            return Err(ProbeError::Failed {
                executable: executable.to_path_buf(),
                status: output.status,
                output: text.into_owned(),
            });
        }

        let version = parse_version(&text)?;
        debug!(executable = %executable.display(), version, "probed jextract");

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(executable.to_path_buf(), version);
        Ok(version)
    }

    fn cached(&self, executable: &Path) -> Option<u32> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(executable)
            .copied()
    }
}
