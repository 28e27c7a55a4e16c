//! Crate-wide error type.
//!
//! Each module has its own `thiserror` enum. [`Error`] wraps them so that
//! callers crossing module boundaries (the store, the generator, the CLI) can
//! carry a single type and still ask what category of failure occurred.

use std::sync::Arc;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::exec::ExecError;
use crate::io::download::DownloadError;
use crate::io::extract::ExtractError;
use crate::locate::LocateError;
use crate::manifest::ManifestError;
use crate::probe::ProbeError;

/// An error that may be observed by several consumers at once.
///
/// Installation results are memoized, so every library waiting on a failed
/// installation receives a clone of the same error.
pub type SharedError = Arc<Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Resolution(#[from] CatalogError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error(transparent)]
    ExecutableNotFound(#[from] LocateError),

    #[error(transparent)]
    VersionParse(#[from] ProbeError),

    #[error(transparent)]
    ToolExecution(#[from] ExecError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure category, independent of which module raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No catalog entry for the version and platform.
    Resolution,
    /// Network or HTTP status failure while downloading.
    DownloadFailed,
    /// The downloaded bytes did not match the declared checksum.
    IntegrityFailed,
    /// The archive could not be unpacked.
    ExtractionFailed,
    /// Zero or several executables found in an installation.
    ExecutableNotFound,
    /// The tool's version output could not be parsed.
    VersionParseError,
    /// The tool could not be started or exited non-zero.
    ToolExecutionFailed,
    /// The project manifest is missing or invalid.
    Configuration,
    /// Any other filesystem error.
    Io,
}

impl Error {
    /// The failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::Download(DownloadError::Integrity { .. }) => ErrorKind::IntegrityFailed,
            Self::Download(_) => ErrorKind::DownloadFailed,
            Self::Extraction(_) => ErrorKind::ExtractionFailed,
            Self::ExecutableNotFound(_) => ErrorKind::ExecutableNotFound,
            Self::VersionParse(ProbeError::Spawn { .. } | ProbeError::Failed { .. })
            | Self::ToolExecution(_) => ErrorKind::ToolExecutionFailed,
            Self::VersionParse(_) => ErrorKind::VersionParseError,
            Self::Manifest(_) => ErrorKind::Configuration,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}
