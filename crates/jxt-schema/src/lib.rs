//! Shared value types for jxt.
//!
//! Everything in this crate is a plain, immutable value: no I/O, no network.
//! The engine in `jxt-core` and the `jxt` binary both speak these types.

pub mod error;
pub mod hash;
pub mod platform;
pub mod types;

// Re-exports
pub use error::ParseError;
pub use hash::*;
pub use platform::*;
pub use types::*;

/// Base name of the jextract executable (without any platform suffix).
pub const TOOL_NAME: &str = "jextract";
