//! Terminal output.
//!
//! Progress goes to stderr so that stdout carries only command results
//! (paths, URLs) and stays scriptable.

use std::path::Path;

use crossterm::style::Stylize;
use jxt_core::Reporter;
use jxt_core::store::{Installation, Origin};
use jxt_schema::Resource;

/// Width of the left-hand status column.
const STATUS_WIDTH: usize = 10;

/// Human-readable byte count.
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;
    if mb >= 1024.0 {
        format!("{:.1} GB", mb / 1024.0)
    } else if kb >= 1024.0 {
        format!("{mb:.1} MB")
    } else if kb >= 1.0 {
        format!("{kb:.1} KB")
    } else {
        format!("{bytes} B")
    }
}

fn status(word: &str) -> String {
    format!("{word:>STATUS_WIDTH$}")
}

/// Line-oriented reporter for interactive use.
#[derive(Debug, Default)]
pub struct TerminalReporter;

impl TerminalReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for TerminalReporter {
    fn section(&self, title: &str) {
        eprintln!("{}", title.bold());
    }

    fn downloading(&self, resource: &Resource, current: u64, total: Option<u64>) {
        match total {
            _ if current == 0 => {
                eprintln!("{} {}", status("fetching").cyan(), resource.file_name());
            }
            Some(total) if current >= total => {
                eprintln!(
                    "{} {} ({})",
                    status("fetched").cyan(),
                    resource.file_name(),
                    format_size(total).dark_grey()
                );
            }
            _ => {}
        }
    }

    fn extracting(&self, version: u32, dest: &Path) {
        eprintln!(
            "{} jextract {version} into {}",
            status("unpacking").cyan(),
            dest.display()
        );
    }

    fn installed(&self, installation: &Installation) {
        let how = match installation.origin {
            Origin::Downloaded { .. } => "installed",
            Origin::Local => "found",
        };
        eprintln!(
            "{} jextract {} at {}",
            status(how).green(),
            installation.version,
            installation.executable.display()
        );
    }

    fn generating(&self, library: &str) {
        eprintln!("{} {library}", status("generating").cyan());
    }

    fn done(&self, library: &str, detail: &str) {
        eprintln!("{} {library} {}", status("done").green(), detail.dark_grey());
    }

    fn failed(&self, subject: &str, reason: &str) {
        eprintln!("{} {subject}: {reason}", status("failed").red());
    }

    fn info(&self, msg: &str) {
        eprintln!("{msg}");
    }

    fn warning(&self, msg: &str) {
        eprintln!("{} {msg}", status("warning").yellow());
    }
}
