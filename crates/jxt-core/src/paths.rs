use dirs::home_dir;
use std::path::{Path, PathBuf};

/// Returns the jxt home directory, or None if the user's home cannot be resolved.
pub fn try_jxt_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("JXT_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".jxt"))
}

/// Returns the jxt home directory (`~/.jxt`).
///
/// Falls back to `.jxt` in the working directory if neither `JXT_HOME` is set
/// nor the user's home directory can be resolved.
pub fn jxt_home() -> PathBuf {
    try_jxt_home().unwrap_or_else(|| PathBuf::from(".jxt"))
}

/// Cache path: ~/.jxt/cache
pub fn cache_path() -> PathBuf {
    jxt_home().join("cache")
}

/// Directory structure of a download/installation cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    root: PathBuf,
}

impl Default for CacheLayout {
    fn default() -> Self {
        Self::new(cache_path())
    }
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<cache>/downloads`
    pub fn downloads(&self) -> PathBuf {
        self.root.join("downloads")
    }

    /// `<cache>/downloads/<file_name>`
    pub fn archive(&self, file_name: &str) -> PathBuf {
        self.downloads().join(file_name)
    }

    /// `<cache>/installation`
    pub fn installations(&self) -> PathBuf {
        self.root.join("installation")
    }

    /// `<cache>/installation/<version>`
    pub fn installation(&self, version: u32) -> PathBuf {
        self.installations().join(version.to_string())
    }
}
