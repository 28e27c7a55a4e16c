//! jxt - fetch, cache and run jextract
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Generates Java bindings for native libraries declared in a `jxt.toml`
//! manifest, downloading a jextract release that matches the project's Java
//! version on first use.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.jxt/
//! └── cache/
//!     ├── downloads/      # Verified distribution archives
//!     └── installation/   # One extracted release per jextract version
//! ```

pub mod cmd;
pub mod context;
pub mod ui;

use clap::{Parser, Subcommand};
use jxt_schema::{Architecture, OperatingSystem, Platform};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "jxt")]
#[command(author, version, about = "jxt - fetch, cache and run jextract")]
pub struct Cli {
    /// Show debug logs (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project manifest
    #[arg(long, global = true, env = "JXT_MANIFEST", default_value = jxt_core::manifest::MANIFEST_FILE)]
    pub manifest: PathBuf,

    /// Download and installation cache [default: $JXT_HOME/cache]
    #[arg(long, global = true, env = "JXT_CACHE")]
    pub cache: Option<PathBuf>,

    /// Catalog override file (properties format)
    #[arg(long, global = true, env = "JXT_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Target platform as <os>-<arch>, e.g. linux-aarch64
    #[arg(long, global = true, env = "JXT_PLATFORM")]
    pub platform: Option<Platform>,

    /// Override the operating system (linux, mac, windows)
    #[arg(long, global = true)]
    pub os: Option<OperatingSystem>,

    /// Override the architecture (x64, aarch64)
    #[arg(long, global = true)]
    pub arch: Option<Architecture>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The platform to resolve distributions for.
    pub fn target_platform(&self) -> Platform {
        let base = self.platform.unwrap_or_else(Platform::current);
        Platform::new(self.os.unwrap_or(base.os), self.arch.unwrap_or(base.arch))
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate bindings for the libraries in the manifest
    Generate {
        /// Only these libraries (default: all)
        libraries: Vec<String>,
        /// Maximum concurrent jextract processes [default: number of CPUs]
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Write every symbol a library's header declares to an arg file
    DumpIncludes {
        /// Library name from the manifest
        library: String,
        /// Arg file to write [default: build/reports/jextract/<library>-includes.txt]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Download and extract jextract without generating anything
    Install {
        /// Java version to install for (default: from the manifest)
        #[arg(conflicts_with = "local")]
        java_version: Option<u32>,
        /// Use an existing installation instead
        #[arg(long)]
        local: Option<PathBuf>,
    },
    /// Show which distribution a Java version resolves to
    Resolve {
        /// Java version
        java_version: u32,
    },
    /// Remove downloaded archives and installations
    Clean {
        /// Only this Java version (default: everything)
        java_version: Option<u32>,
    },
}
