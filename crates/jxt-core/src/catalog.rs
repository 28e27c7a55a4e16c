//! Distribution catalog: which archive to download for a runtime version and
//! platform.
//!
//! The catalog is a flat key/value table in Java properties syntax:
//!
//! ```text
//! jextract.22.linux.x64.url=https://.../openjdk-22-jextract+5-33_linux-x64_bin.tar.gz
//! jextract.22.linux.x64.sha-256=53d66299...
//! ```
//!
//! A default table is embedded in the binary. An override file can replace
//! or add individual keys without restating the whole table.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use jxt_schema::{ChecksumAlgorithm, Platform, Resource, TOOL_NAME};
use thiserror::Error;
use tracing::{debug, warn};

/// Oldest jextract release the catalog knows about.
pub const MIN_TOOL_VERSION: u32 = 19;

/// Newest jextract release the catalog knows about.
pub const MAX_TOOL_VERSION: u32 = 22;

const EMBEDDED_CATALOG: &str = include_str!("../data/jextract.properties");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("No jextract distribution for version {version} on {platform}")]
    Unresolved { version: u32, platform: Platform },

    #[error("Distribution URL for version {version} on {platform} names no archive file: {url}")]
    NoFileName {
        version: u32,
        platform: Platform,
        url: String,
    },

    #[error("Failed to read catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Mapping from `(tool version, platform)` to a downloadable [`Resource`].
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    /// The catalog compiled into this binary.
    pub fn embedded() -> Self {
        Self {
            entries: parse_properties(EMBEDDED_CATALOG),
        }
    }

    /// A catalog consisting only of the given properties text.
    pub fn parse(text: &str) -> Self {
        Self {
            entries: parse_properties(text),
        }
    }

    /// Layer `text` over this catalog; its keys take precedence.
    pub fn with_overrides(mut self, text: &str) -> Self {
        self.entries.extend(parse_properties(text));
        self
    }

    /// The embedded catalog, optionally overridden by a file.
    ///
    /// A path that does not exist is ignored so that a project can point at
    /// an optional override file unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the override file exists but cannot be
    /// read.
    pub fn load(overrides: Option<&Path>) -> Result<Self, CatalogError> {
        let catalog = Self::embedded();
        let Some(path) = overrides else {
            return Ok(catalog);
        };
        if !path.exists() {
            warn!(path = %path.display(), "catalog override file not found, using defaults");
            return Ok(catalog);
        }
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded catalog overrides");
        Ok(catalog.with_overrides(&text))
    }

    /// Clamp a requested runtime version into the supported tool range.
    ///
    /// ```
    /// use jxt_core::catalog::Catalog;
    ///
    /// assert_eq!(Catalog::tool_version(17), 19);
    /// assert_eq!(Catalog::tool_version(21), 21);
    /// assert_eq!(Catalog::tool_version(24), 22);
    /// ```
    pub fn tool_version(runtime_version: u32) -> u32 {
        runtime_version.clamp(MIN_TOOL_VERSION, MAX_TOOL_VERSION)
    }

    /// Resolve the archive for a runtime version on a platform.
    ///
    /// The version is clamped first. Each key falls back from the requested
    /// architecture to x64 independently.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unresolved`] if neither the platform nor its
    /// x64 sibling has both a URL and a checksum, and
    /// [`CatalogError::NoFileName`] if the URL's last segment cannot serve as
    /// the archive's file name in the download cache.
    pub fn resolve(&self, runtime_version: u32, platform: Platform) -> Result<Resource, CatalogError> {
        let version = Self::tool_version(runtime_version);
        let unresolved = || CatalogError::Unresolved { version, platform };

        let url = self
            .lookup(version, platform, "url")
            .ok_or_else(unresolved)?;

        let (algorithm, checksum) = [platform, platform.with_x64()]
            .into_iter()
            .find_map(|candidate| {
                ChecksumAlgorithm::ALL.into_iter().find_map(|algorithm| {
                    self.get(&key(version, candidate, algorithm.catalog_key()))
                        .map(|checksum| (algorithm, checksum))
                })
            })
            .ok_or_else(unresolved)?;

        let resource = Resource::new(url, checksum).with_algorithm(algorithm);
        if matches!(resource.file_name(), "" | "." | "..") {
            return Err(CatalogError::NoFileName {
                version,
                platform,
                url: resource.url,
            });
        }
        Ok(resource)
    }

    /// Tool versions that have at least one entry.
    pub fn versions(&self) -> BTreeSet<u32> {
        self.entries
            .keys()
            .filter_map(|k| k.strip_prefix(TOOL_NAME)?.strip_prefix('.'))
            .filter_map(|rest| rest.split('.').next()?.parse().ok())
            .collect()
    }

    fn lookup(&self, version: u32, platform: Platform, suffix: &str) -> Option<&str> {
        self.get(&key(version, platform, suffix))
            .or_else(|| self.get(&key(version, platform.with_x64(), suffix)))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

fn key(version: u32, platform: Platform, suffix: &str) -> String {
    format!("{TOOL_NAME}.{version}.{}.{}.{suffix}", platform.os, platform.arch)
}

/// Parse Java properties text into a map.
///
/// Supports `#` and `!` comments, `=` or `:` separators and surrounding
/// whitespace. A line without a separator is a key with an empty value.
fn parse_properties(text: &str) -> HashMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .map(|line| match line.find(['=', ':']) {
            Some(idx) => (line[..idx].trim().to_string(), line[idx + 1..].trim().to_string()),
            None => (line.to_string(), String::new()),
        })
        .collect()
}
