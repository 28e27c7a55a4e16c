//! Reporter trait for dependency injection
//!
//! Core logic reports progress through this trait so that it is not coupled
//! to a particular terminal presentation.

use std::path::Path;

use jxt_schema::Resource;

use crate::store::Installation;

pub trait Reporter: Send + Sync {
    /// Indicates a new section or phase has started (e.g. "Installing").
    fn section(&self, title: &str);

    /// Updates the progress of a download.
    fn downloading(&self, resource: &Resource, current: u64, total: Option<u64>);

    /// An archive is being unpacked for a tool version.
    fn extracting(&self, version: u32, dest: &Path);

    /// An installation is ready for use.
    fn installed(&self, installation: &Installation);

    /// Bindings generation started for a library.
    fn generating(&self, library: &str);

    /// Marks a library as successfully processed.
    fn done(&self, library: &str, detail: &str);

    /// Marks an operation as failed with a specific reason.
    fn failed(&self, subject: &str, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn downloading(&self, resource: &Resource, current: u64, total: Option<u64>) {
        (**self).downloading(resource, current, total);
    }
    fn extracting(&self, version: u32, dest: &Path) {
        (**self).extracting(version, dest);
    }
    fn installed(&self, installation: &Installation) {
        (**self).installed(installation);
    }
    fn generating(&self, library: &str) {
        (**self).generating(library);
    }
    fn done(&self, library: &str, detail: &str) {
        (**self).done(library, detail);
    }
    fn failed(&self, subject: &str, reason: &str) {
        (**self).failed(subject, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn downloading(&self, _: &Resource, _: u64, _: Option<u64>) {}
    fn extracting(&self, _: u32, _: &Path) {}
    fn installed(&self, _: &Installation) {}
    fn generating(&self, _: &str) {}
    fn done(&self, _: &str, _: &str) {}
    fn failed(&self, _: &str, _: &str) {}
    fn info(&self, _: &str) {}
    fn warning(&self, _: &str) {}
}
