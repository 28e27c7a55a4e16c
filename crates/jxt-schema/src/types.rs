//! Distribution resources, archive formats and symbol kinds.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::hash::{Checksum, ChecksumAlgorithm};

/// A downloadable jextract distribution archive.
///
/// Identifies exactly one archive: the checksum pins its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    /// Download URL.
    pub url: String,

    /// Expected digest of the archive.
    pub checksum: Checksum,

    /// Algorithm the checksum was computed with.
    #[serde(default)]
    pub algorithm: ChecksumAlgorithm,
}

impl Resource {
    /// Create a resource with the default algorithm (`SHA-256`).
    pub fn new(url: impl Into<String>, checksum: impl AsRef<str>) -> Self {
        Self {
            url: url.into(),
            checksum: Checksum::new(checksum),
            algorithm: ChecksumAlgorithm::default(),
        }
    }

    /// Override the checksum algorithm.
    pub fn with_algorithm(mut self, algorithm: ChecksumAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// The archive file name: the last path segment of the URL, without any
    /// query string or fragment.
    ///
    /// ```
    /// use jxt_schema::Resource;
    ///
    /// let r = Resource::new("https://example.com/a/openjdk-22-jextract+5-33_linux-x64_bin.tar.gz?x=1", "00");
    /// assert_eq!(r.file_name(), "openjdk-22-jextract+5-33_linux-x64_bin.tar.gz");
    /// ```
    pub fn file_name(&self) -> &str {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/').next().unwrap_or_default()
    }

    /// Archive format inferred from the file name.
    pub fn format(&self) -> Option<ArchiveFormat> {
        ArchiveFormat::detect(self.file_name())
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} {})", self.url, self.algorithm, self.checksum)
    }
}

/// Archive format of a distribution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// Gzip-compressed tar archive (`.tar.gz` / `.tgz`).
    #[serde(rename = "tar.gz")]
    TarGz,
    /// Zstandard-compressed tar archive (`.tar.zst` / `.tzst`).
    #[serde(rename = "tar.zst")]
    TarZst,
    /// Uncompressed tar archive (`.tar`).
    Tar,
    /// Zip archive (`.zip`).
    Zip,
}

impl ArchiveFormat {
    /// Detect the format from a file name or path, case-insensitively.
    /// Returns `None` for anything that is not a recognised archive.
    pub fn detect(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
            Some(Self::TarZst)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// Category of C symbol that can be whitelisted for binding generation.
///
/// The declaration order is the order in which `--include-*` flags are
/// emitted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// Function declarations.
    Function,
    /// Macro constants and enum constants.
    Constant,
    /// Struct declarations.
    Struct,
    /// Union declarations.
    Union,
    /// Typedefs.
    Typedef,
    /// Global variables.
    #[serde(alias = "var")]
    Variable,
}

impl SymbolKind {
    /// Every kind, in emission order.
    pub const ALL: [Self; 6] = [
        Self::Function,
        Self::Constant,
        Self::Struct,
        Self::Union,
        Self::Typedef,
        Self::Variable,
    ];

    /// The jextract flag that whitelists one symbol of this kind.
    ///
    /// Variables are spelled `--include-var` by the tool.
    pub fn include_flag(self) -> &'static str {
        match self {
            Self::Function => "--include-function",
            Self::Constant => "--include-constant",
            Self::Struct => "--include-struct",
            Self::Union => "--include-union",
            Self::Typedef => "--include-typedef",
            Self::Variable => "--include-var",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Function => "function",
            Self::Constant => "constant",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Typedef => "typedef",
            Self::Variable => "variable",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for SymbolKind {
    type Err = ParseError;

    /// Accepts the singular kind name; `var` is a synonym for `variable`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "function" => Ok(Self::Function),
            "constant" => Ok(Self::Constant),
            "struct" => Ok(Self::Struct),
            "union" => Ok(Self::Union),
            "typedef" => Ok(Self::Typedef),
            "variable" | "var" => Ok(Self::Variable),
            _ => Err(ParseError::UnknownSymbolKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_archive_formats() {
        assert_eq!(ArchiveFormat::detect("foo.tar.gz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::detect("FOO.TGZ"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::detect("foo.tar.zst"), Some(ArchiveFormat::TarZst));
        assert_eq!(ArchiveFormat::detect("foo.tar"), Some(ArchiveFormat::Tar));
        assert_eq!(ArchiveFormat::detect("foo.ZIP"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::detect("foo.dmg"), None);
    }

    #[test]
    fn resource_defaults_to_sha256() {
        let r = Resource::new("https://example.com/x.tar.gz", "AB");
        assert_eq!(r.algorithm, ChecksumAlgorithm::Sha256);
        assert_eq!(r.checksum.as_str(), "ab");
        assert_eq!(r.format(), Some(ArchiveFormat::TarGz));
    }

    #[test]
    fn symbol_kinds_sort_in_emission_order() {
        let mut kinds = vec![SymbolKind::Variable, SymbolKind::Function, SymbolKind::Union];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![SymbolKind::Function, SymbolKind::Union, SymbolKind::Variable]
        );
        assert_eq!(SymbolKind::Variable.include_flag(), "--include-var");
    }

    #[test]
    fn parses_symbol_kinds() {
        assert_eq!("var".parse(), Ok(SymbolKind::Variable));
        assert_eq!("Typedef".parse(), Ok(SymbolKind::Typedef));
        assert!("functions".parse::<SymbolKind>().is_err());
        for kind in SymbolKind::ALL {
            assert_eq!(kind.to_string().parse(), Ok(kind));
        }
    }
}
