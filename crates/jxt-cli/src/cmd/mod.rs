//! Subcommand implementations.

pub mod clean;
pub mod dump_includes;
pub mod generate;
pub mod install;
pub mod resolve;
