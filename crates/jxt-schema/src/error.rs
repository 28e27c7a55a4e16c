//! Parse errors for schema values.

use thiserror::Error;

/// A string could not be parsed into a schema value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not `linux`, `mac` or `windows`.
    #[error("Unknown operating system: {0}")]
    UnknownOs(String),

    /// Not `x64` or `aarch64` (or a known alias).
    #[error("Unknown architecture: {0}")]
    UnknownArch(String),

    /// Not of the form `<os>-<arch>`.
    #[error("Expected <os>-<arch>, got '{0}'")]
    MalformedPlatform(String),

    /// Not one of the supported SHA-2 digests.
    #[error("Unsupported checksum algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Wrong length or non-hex characters for the algorithm.
    #[error("Invalid {algorithm} checksum: expected {expected} hex chars, got '{value}'")]
    InvalidChecksum {
        /// Algorithm name.
        algorithm: &'static str,
        /// Required length.
        expected: usize,
        /// Rejected input.
        value: String,
    },

    /// Not a jextract symbol kind.
    #[error("Unknown symbol kind: {0}")]
    UnknownSymbolKind(String),
}
