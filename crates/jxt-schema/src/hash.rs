//! Checksums and streaming digests for distribution archives.

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::ParseError;

/// Digest algorithm declared for a downloadable resource.
///
/// Names follow the Java `MessageDigest` spelling used by the upstream
/// distribution catalog (`SHA-256`), and parse case-insensitively with or
/// without the dash (`sha-256`, `sha256`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChecksumAlgorithm {
    /// SHA-256 (the default; every published jextract archive uses it).
    #[default]
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl ChecksumAlgorithm {
    /// All supported algorithms, in catalog lookup preference order.
    pub const ALL: [Self; 3] = [Self::Sha256, Self::Sha384, Self::Sha512];

    /// Canonical name (`SHA-256`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }

    /// Key suffix used in catalog files (`sha-256`).
    pub fn catalog_key(self) -> &'static str {
        match self {
            Self::Sha256 => "sha-256",
            Self::Sha384 => "sha-384",
            Self::Sha512 => "sha-512",
        }
    }

    /// Length of a hex-encoded digest produced by this algorithm.
    pub fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha384 => 96,
            Self::Sha512 => 128,
        }
    }

    /// Start a streaming digest for this algorithm.
    pub fn hasher(self) -> StreamingDigest {
        match self {
            Self::Sha256 => StreamingDigest::Sha256(Sha256::new()),
            Self::Sha384 => StreamingDigest::Sha384(Sha384::new()),
            Self::Sha512 => StreamingDigest::Sha512(Sha512::new()),
        }
    }
}

impl std::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChecksumAlgorithm {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(ParseError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl Serialize for ChecksumAlgorithm {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChecksumAlgorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A lowercase hex digest string.
///
/// Comparison is case-insensitive by construction: the value is normalised to
/// lowercase on creation, matching the output of [`StreamingDigest::finalize_hex`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    /// Create a checksum without validation (catalog data is trusted to be
    /// well-formed; a bad value simply never matches).
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().trim().to_ascii_lowercase())
    }

    /// Create a checksum, validating length and hex alphabet for `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidChecksum`] if `s` is not exactly
    /// [`ChecksumAlgorithm::hex_len`] ASCII hex characters.
    pub fn validated(s: &str, algorithm: ChecksumAlgorithm) -> Result<Self, ParseError> {
        let s = s.trim();
        if s.len() == algorithm.hex_len() && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self::new(s))
        } else {
            Err(ParseError::InvalidChecksum {
                algorithm: algorithm.as_str(),
                expected: algorithm.hex_len(),
                value: s.to_string(),
            })
        }
    }

    /// Return the inner hex string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Checksum {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Checksum {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for Checksum {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}

/// Incremental digest over one of the supported algorithms.
#[derive(Debug, Clone)]
pub enum StreamingDigest {
    /// SHA-256 state.
    Sha256(Sha256),
    /// SHA-384 state.
    Sha384(Sha384),
    /// SHA-512 state.
    Sha512(Sha512),
}

impl StreamingDigest {
    /// Feed more bytes.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    /// Finish and return the digest.
    pub fn finalize(self) -> Checksum {
        let hex = match self {
            Self::Sha256(h) => hex::encode(h.finalize()),
            Self::Sha384(h) => hex::encode(h.finalize()),
            Self::Sha512(h) => hex::encode(h.finalize()),
        };
        Checksum(hex)
    }

    /// Finish and return the digest as a hex string.
    pub fn finalize_hex(self) -> String {
        self.finalize().0
    }
}
