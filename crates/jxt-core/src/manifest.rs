//! Project manifest parsing.
//!
//! A `jxt.toml` manifest selects the jextract installation and declares the
//! native libraries to generate bindings for:
//!
//! ```toml
//! [jextract]
//! java-version = 22
//!
//! [libraries.bass]
//! header = "include/bass.h"
//! includes = ["include"]
//! target-package = "com.un4seen.bass"
//!
//! [libraries.bass.whitelist]
//! function = ["BASS_GetVersion"]
//! ```
//!
//! Relative paths are resolved against the directory containing the manifest.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use jxt_schema::SymbolKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::store::InstallationSource;

/// Conventional manifest file name.
pub const MANIFEST_FILE: &str = "jxt.toml";

/// Output root used when the manifest does not set one.
pub const DEFAULT_OUTPUT: &str = "build/generated/sources/jextract";

/// Directory for `--dump-includes` arg files.
pub const DUMP_INCLUDES_DIR: &str = "build/reports/jextract";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid manifest: {0}")]
    Invalid(String),
}

/// Everything needed to generate bindings for one native library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Library name; also the default output subdirectory.
    pub name: String,
    /// Entry header file.
    pub header: PathBuf,
    /// Include directories, in search order.
    pub includes: Vec<PathBuf>,
    /// Preprocessor definitions, `NAME` or `NAME=value`.
    pub definitions: Vec<String>,
    /// Java package of the generated sources.
    pub target_package: Option<String>,
    /// Name of the generated header class.
    pub header_class_name: Option<String>,
    /// Symbols to generate. Empty means everything.
    pub whitelist: BTreeMap<SymbolKind, BTreeSet<String>>,
    /// Native libraries the generated code loads, in order.
    pub libraries: Vec<String>,
    /// Load libraries via `System::loadLibrary` (jextract 22+).
    pub use_system_load_library: bool,
    /// Emit Java sources instead of class files (jextract 21 and older).
    pub generate_source_files: bool,
    /// Output directory.
    pub output: PathBuf,
    /// Optional `@argfile` with further options.
    pub arg_file: Option<PathBuf>,
}

impl LibraryConfig {
    /// A library with only the required settings.
    pub fn new(name: impl Into<String>, header: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            header: header.into(),
            includes: Vec::new(),
            definitions: Vec::new(),
            target_package: None,
            header_class_name: None,
            whitelist: BTreeMap::new(),
            libraries: Vec::new(),
            use_system_load_library: false,
            generate_source_files: false,
            output: output.into(),
            arg_file: None,
        }
    }

    /// Add a symbol to the whitelist.
    pub fn whitelist(mut self, kind: SymbolKind, name: impl Into<String>) -> Self {
        self.whitelist.entry(kind).or_default().insert(name.into());
        self
    }
}

/// The `[jextract]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ToolSection {
    /// Java feature release to download a matching jextract for.
    pub java_version: Option<u32>,
    /// Existing jextract installation directory.
    pub local: Option<PathBuf>,
    /// Catalog override file.
    pub catalog: Option<PathBuf>,
    /// Output root; each library writes to `<output>/<name>` by default.
    pub output: Option<PathBuf>,
    /// Project-wide default for `generate-source-files`.
    #[serde(default)]
    pub generate_source_files: bool,
}

/// A `[libraries.<name>]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LibrarySection {
    pub header: PathBuf,
    #[serde(default)]
    pub includes: Vec<PathBuf>,
    #[serde(default)]
    pub definitions: Vec<String>,
    pub target_package: Option<String>,
    pub header_class_name: Option<String>,
    #[serde(default)]
    pub whitelist: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub libraries: Vec<String>,
    #[serde(default)]
    pub use_system_load_library: bool,
    pub generate_source_files: Option<bool>,
    pub output: Option<PathBuf>,
    pub arg_file: Option<PathBuf>,
}

/// A parsed `jxt.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub jextract: ToolSection,
    #[serde(default)]
    pub libraries: BTreeMap<String, LibrarySection>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Manifest {
    /// Asynchronously load and validate a manifest from the given file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation (see [`Manifest::from_toml`]).
    pub async fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|source| ManifestError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut manifest: Manifest =
            toml::from_str(&content).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        manifest.base_dir = base_dir.to_path_buf();
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse manifest text, resolving relative paths against `base_dir`.
    ///
    /// # Errors
    ///
    /// Fails if the text is not a valid manifest, if both or neither of
    /// `java-version` and `local` are set, or if a whitelist names an
    /// unknown symbol kind.
    pub fn from_toml(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ManifestError> {
        let mut manifest: Manifest = toml::from_str(text).map_err(|source| ManifestError::Parse {
            path: PathBuf::from(MANIFEST_FILE),
            source,
        })?;
        manifest.base_dir = base_dir.into();
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        self.source()?;
        self.libraries()?;
        Ok(())
    }

    /// Directory the manifest was loaded from.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Which jextract installation the project uses.
    pub fn source(&self) -> Result<InstallationSource, ManifestError> {
        match (self.jextract.java_version, &self.jextract.local) {
            (Some(runtime_version), None) => Ok(InstallationSource::Remote { runtime_version }),
            (None, Some(path)) => Ok(InstallationSource::Local {
                path: self.base_dir.join(path),
            }),
            (Some(_), Some(_)) => Err(ManifestError::Invalid(
                "[jextract] sets both java-version and local".into(),
            )),
            (None, None) => Err(ManifestError::Invalid(
                "[jextract] must set either java-version or local".into(),
            )),
        }
    }

    /// The catalog override file, if configured.
    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.jextract.catalog.as_ref().map(|p| self.base_dir.join(p))
    }

    /// Root under which each library's output directory lives.
    pub fn output_root(&self) -> PathBuf {
        let output = self
            .jextract
            .output
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT));
        self.base_dir.join(output)
    }

    /// Default arg file for dumping a library's includes.
    pub fn dump_includes_path(&self, library: &str) -> PathBuf {
        self.base_dir
            .join(DUMP_INCLUDES_DIR)
            .join(format!("{library}-includes.txt"))
    }

    /// All libraries, with paths resolved and defaults applied.
    pub fn libraries(&self) -> Result<Vec<LibraryConfig>, ManifestError> {
        self.libraries
            .iter()
            .map(|(name, section)| self.resolve_library(name, section))
            .collect()
    }

    /// One library by name.
    pub fn library(&self, name: &str) -> Result<LibraryConfig, ManifestError> {
        let section = self
            .libraries
            .get(name)
            .ok_or_else(|| ManifestError::Invalid(format!("no library named '{name}'")))?;
        self.resolve_library(name, section)
    }

    fn resolve_library(&self, name: &str, section: &LibrarySection) -> Result<LibraryConfig, ManifestError> {
        let mut whitelist: BTreeMap<SymbolKind, BTreeSet<String>> = BTreeMap::new();
        for (kind, names) in &section.whitelist {
            let kind: SymbolKind = kind
                .parse()
                .map_err(|e| ManifestError::Invalid(format!("libraries.{name}.whitelist: {e}")))?;
            whitelist.entry(kind).or_default().extend(names.iter().cloned());
        }

        let output = section
            .output
            .as_ref()
            .map_or_else(|| self.output_root().join(name), |p| self.base_dir.join(p));

        Ok(LibraryConfig {
            name: name.to_string(),
            header: self.base_dir.join(&section.header),
            includes: section.includes.iter().map(|p| self.base_dir.join(p)).collect(),
            definitions: section.definitions.clone(),
            target_package: section.target_package.clone(),
            header_class_name: section.header_class_name.clone(),
            whitelist,
            libraries: section.libraries.clone(),
            use_system_load_library: section.use_system_load_library,
            generate_source_files: section
                .generate_source_files
                .unwrap_or(self.jextract.generate_source_files),
            output,
            arg_file: section.arg_file.as_ref().map(|p| self.base_dir.join(p)),
        })
    }
}
