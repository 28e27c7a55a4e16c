//! Build jextract command lines.
//!
//! The set of accepted flags changed between releases: `--source` was
//! removed in 22 (sources became the only output) and
//! `--use-system-load-library` was added. [`Dialect`] captures which side of
//! that line a tool version falls on so [`compile`] never emits a flag the
//! tool would reject.

use std::path::Path;

use crate::manifest::LibraryConfig;

/// Last release that still accepts `--source`.
pub const LAST_LEGACY_VERSION: u32 = 21;

/// Version-dependent command line flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// jextract 21 and older.
    Legacy,
    /// jextract 22 and newer.
    Modern,
}

impl Dialect {
    pub fn for_version(tool_version: u32) -> Self {
        if tool_version <= LAST_LEGACY_VERSION {
            Self::Legacy
        } else {
            Self::Modern
        }
    }

    /// The gated flag this library asks for, if this dialect supports it.
    fn gated_flag(self, library: &LibraryConfig) -> Option<&'static str> {
        match self {
            Self::Legacy if library.generate_source_files => Some("--source"),
            Self::Modern if library.use_system_load_library => Some("--use-system-load-library"),
            Self::Legacy | Self::Modern => None,
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Arguments for generating bindings for `library` with jextract `tool_version`.
///
/// The header path is always last.
pub fn compile(library: &LibraryConfig, tool_version: u32) -> Vec<String> {
    let mut args = vec!["--output".to_string(), path_arg(&library.output)];

    if let Some(name) = &library.header_class_name {
        args.extend(["--header-class-name".to_string(), name.clone()]);
    }
    if let Some(package) = &library.target_package {
        args.extend(["-t".to_string(), package.clone()]);
    }
    for include in &library.includes {
        args.extend(["-I".to_string(), path_arg(include)]);
    }
    for definition in &library.definitions {
        args.extend(["-D".to_string(), definition.clone()]);
    }
    // BTreeMap/BTreeSet iteration gives kind order, then sorted names
    for (kind, names) in &library.whitelist {
        for name in names {
            args.extend([kind.include_flag().to_string(), name.clone()]);
        }
    }
    for lib in &library.libraries {
        args.extend(["-l".to_string(), lib.clone()]);
    }
    if let Some(flag) = Dialect::for_version(tool_version).gated_flag(library) {
        args.push(flag.to_string());
    }
    if let Some(arg_file) = &library.arg_file {
        args.push(format!("@{}", arg_file.display()));
    }

    args.push(path_arg(&library.header));
    args
}

/// Arguments for writing the header's full symbol list to `arg_file`.
///
/// The resulting file holds one `--include-*` line per symbol and can be
/// trimmed by hand and passed back through [`LibraryConfig::arg_file`].
pub fn compile_dump_includes(library: &LibraryConfig, arg_file: &Path) -> Vec<String> {
    let mut args = Vec::new();
    for include in &library.includes {
        args.extend(["-I".to_string(), path_arg(include)]);
    }
    args.extend(["--dump-includes".to_string(), path_arg(arg_file)]);
    args.push(path_arg(&library.header));
    args
}
