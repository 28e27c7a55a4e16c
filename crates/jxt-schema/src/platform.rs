//! Host platform detection.
//!
//! jextract ships one archive per operating system and processor
//! architecture. The platform is used to select the matching entry from the
//! distribution catalog and to name the executable inside an installation.
//!
//! # Example
//!
//! ```
//! use jxt_schema::{Architecture, OperatingSystem, Platform};
//!
//! let platform = Platform::detect("Mac OS X", "aarch64");
//! assert_eq!(platform.os, OperatingSystem::Mac);
//! assert_eq!(platform.arch, Architecture::Aarch64);
//! assert_eq!(platform.to_string(), "mac-aarch64");
//! ```

use std::sync::OnceLock;

use tracing::debug;

use crate::error::ParseError;

/// Operating system assumed when the OS name matches none of the known
/// families.
///
/// This is a policy decision, not a detection result: earlier releases of the
/// build plugin disagreed on it (Windows vs. Linux). Callers that care can
/// override the detected platform explicitly.
pub const FALLBACK_OS: OperatingSystem = OperatingSystem::Linux;

/// An operating system family that jextract is distributed for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    /// Linux (and any unrecognised Unix, see [`FALLBACK_OS`]).
    Linux,
    /// Apple macOS.
    Mac,
    /// Microsoft Windows.
    Windows,
}

impl OperatingSystem {
    /// Classify a raw OS name (e.g. `std::env::consts::OS` or a JVM-style
    /// `os.name`) by case-insensitive substring match.
    ///
    /// Returns `None` if nothing matched; see [`OperatingSystem::detect`] for
    /// the variant that applies [`FALLBACK_OS`].
    pub fn classify(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        if name.contains("windows") {
            Some(Self::Windows)
        } else if name.contains("mac") {
            Some(Self::Mac)
        } else if name.contains("linux") {
            Some(Self::Linux)
        } else {
            None
        }
    }

    /// Classify a raw OS name, falling back to [`FALLBACK_OS`].
    ///
    /// The fallback is logged at debug level whenever it applies.
    pub fn detect(name: &str) -> Self {
        Self::classify(name).unwrap_or_else(|| {
            debug!(os = name, fallback = %FALLBACK_OS, "unrecognised operating system");
            FALLBACK_OS
        })
    }

    /// Catalog spelling (`linux`, `mac`, `windows`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Mac => "mac",
            Self::Windows => "windows",
        }
    }
}

impl std::fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OperatingSystem {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::classify(s).ok_or_else(|| ParseError::UnknownOs(s.to_string()))
    }
}

/// A processor architecture that jextract is distributed for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    /// `x86_64` / amd64. Every catalog version carries x64 archives, so this
    /// is also the fallback when no aarch64 build exists.
    #[default]
    X64,
    /// ARM64 (Apple Silicon, Graviton, ...).
    Aarch64,
}

impl Architecture {
    /// Classify a raw architecture name by case-insensitive substring match.
    /// Anything mentioning `aarch64` or `arm` is ARM64, everything else x64.
    pub fn detect(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("aarch64") || name.contains("arm") {
            Self::Aarch64
        } else {
            Self::X64
        }
    }

    /// Catalog spelling (`x64`, `aarch64`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Aarch64 => "aarch64",
        }
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Architecture {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Ok(Self::X64),
            "aarch64" | "arm64" => Ok(Self::Aarch64),
            _ => Err(ParseError::UnknownArch(s.to_string())),
        }
    }
}

/// A canonical `{os, arch}` pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Platform {
    /// Operating system family.
    pub os: OperatingSystem,
    /// Processor architecture.
    pub arch: Architecture,
}

impl Platform {
    /// Build a platform from its parts.
    pub const fn new(os: OperatingSystem, arch: Architecture) -> Self {
        Self { os, arch }
    }

    /// Map raw OS and architecture strings to a canonical platform.
    /// Never fails; see [`FALLBACK_OS`].
    pub fn detect(os_name: &str, arch_name: &str) -> Self {
        Self {
            os: OperatingSystem::detect(os_name),
            arch: Architecture::detect(arch_name),
        }
    }

    /// The platform this process runs on, derived once and cached.
    pub fn current() -> Self {
        static CURRENT: OnceLock<Platform> = OnceLock::new();
        *CURRENT.get_or_init(|| Self::detect(std::env::consts::OS, std::env::consts::ARCH))
    }

    /// File name of the jextract launcher on this platform.
    pub fn executable_name(self) -> &'static str {
        match self.os {
            OperatingSystem::Windows => "jextract.bat",
            OperatingSystem::Linux | OperatingSystem::Mac => crate::TOOL_NAME,
        }
    }

    /// The same OS with the x64 architecture, used for catalog fallback.
    pub fn with_x64(self) -> Self {
        Self {
            os: self.os,
            arch: Architecture::X64,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

impl std::str::FromStr for Platform {
    type Err = ParseError;

    /// Parse `<os>-<arch>`, e.g. `linux-aarch64` or `windows-x64`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (os, arch) = s
            .split_once('-')
            .ok_or_else(|| ParseError::MalformedPlatform(s.to_string()))?;
        Ok(Self {
            os: os.parse()?,
            arch: arch.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_windows() {
        for name in ["Windows", "Windows 11", "windows", "windows 10"] {
            assert_eq!(OperatingSystem::detect(name), OperatingSystem::Windows);
        }
    }

    #[test]
    fn detects_mac() {
        for name in ["mac os x", "macOS", "MAC", "macos"] {
            assert_eq!(OperatingSystem::detect(name), OperatingSystem::Mac);
        }
    }

    #[test]
    fn detects_linux_and_falls_back() {
        for name in ["Linux", "linux", "Unix", "freebsd", "Darwin", ""] {
            assert_eq!(OperatingSystem::detect(name), OperatingSystem::Linux);
        }
        assert_eq!(OperatingSystem::classify("linux"), Some(OperatingSystem::Linux));
        assert_eq!(OperatingSystem::classify("Unix"), None);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logged_while(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn fallback_is_logged() {
        let logs = logged_while(|| {
            assert_eq!(OperatingSystem::detect("SunOS"), FALLBACK_OS);
        });
        assert!(logs.contains("unrecognised operating system"));
        assert!(logs.contains("SunOS"));

        let logs = logged_while(|| {
            assert_eq!(OperatingSystem::detect("Linux"), OperatingSystem::Linux);
        });
        assert!(logs.is_empty());
    }

    #[test]
    fn detects_architecture() {
        assert_eq!(Architecture::detect("aarch64"), Architecture::Aarch64);
        assert_eq!(Architecture::detect("ARM64"), Architecture::Aarch64);
        assert_eq!(Architecture::detect("arm"), Architecture::Aarch64);
        assert_eq!(Architecture::detect("x86_64"), Architecture::X64);
        assert_eq!(Architecture::detect("amd64"), Architecture::X64);
        assert_eq!(Architecture::detect("riscv64"), Architecture::X64);
    }

    #[test]
    fn executable_name_depends_on_os() {
        let windows = Platform::new(OperatingSystem::Windows, Architecture::X64);
        let mac = Platform::new(OperatingSystem::Mac, Architecture::Aarch64);
        assert_eq!(windows.executable_name(), "jextract.bat");
        assert_eq!(mac.executable_name(), "jextract");
    }

    #[test]
    fn parses_platform_strings() {
        let p: Platform = "linux-aarch64".parse().unwrap();
        assert_eq!(p, Platform::new(OperatingSystem::Linux, Architecture::Aarch64));
        assert_eq!(p.with_x64().to_string(), "linux-x64");
        assert!("linux".parse::<Platform>().is_err());
        assert!("solaris-x64".parse::<Platform>().is_err());
    }

    #[test]
    fn current_is_stable() {
        assert_eq!(Platform::current(), Platform::current());
    }
}
