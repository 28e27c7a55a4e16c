pub mod catalog;
pub mod command;
pub mod error;
pub mod exec;
pub mod generator;
pub mod io;
pub mod locate;
pub mod manifest;
pub mod paths;
pub mod probe;
pub mod reporter;
pub mod store;

pub use catalog::Catalog;
pub use error::{Error, ErrorKind, SharedError};
pub use generator::{Generator, LibraryOutcome};
pub use manifest::{LibraryConfig, Manifest};
pub use paths::*;
pub use reporter::{NullReporter, Reporter};
pub use store::{Installation, InstallationSource, InstallationStore};

/// User agent sent with every distribution download.
pub const USER_AGENT: &str = concat!("jxt-core/", env!("CARGO_PKG_VERSION"));
