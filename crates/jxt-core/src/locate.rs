//! Find the jextract launcher inside an installation directory.

use std::path::{Path, PathBuf};

use jxt_schema::Platform;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("No executable bin/{name} found under {}", .root.display())]
    NotFound { root: PathBuf, name: &'static str },

    #[error("Found {} candidates for bin/{name} under {}: {}", .matches.len(), .root.display(), list(.matches))]
    Ambiguous {
        root: PathBuf,
        name: &'static str,
        matches: Vec<PathBuf>,
    },
}

fn list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Locate the single `**/bin/<executable>` under `root`.
///
/// Only regular, executable files count. Symlinked directories are not
/// followed.
///
/// # Errors
///
/// [`LocateError::NotFound`] if nothing matches, [`LocateError::Ambiguous`]
/// if more than one file does.
pub fn locate(root: &Path, platform: Platform) -> Result<PathBuf, LocateError> {
    let name = platform.executable_name();

    let mut matches: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .flatten()
        .filter(|entry| entry.file_name() == name)
        .filter(|entry| {
            entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .is_some_and(|dir| dir == "bin")
        })
        .map(walkdir::DirEntry::into_path)
        .filter(|path| is_executable_file(path))
        .collect();

    match matches.len() {
        0 => Err(LocateError::NotFound {
            root: root.to_path_buf(),
            name,
        }),
        1 => {
            let found = matches.remove(0);
            debug!(executable = %found.display(), "located jextract");
            Ok(found)
        }
        _ => {
            matches.sort();
            Err(LocateError::Ambiguous {
                root: root.to_path_buf(),
                name,
                matches,
            })
        }
    }
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxt_schema::{Architecture, OperatingSystem};
    use std::fs;

    fn linux() -> Platform {
        Platform::new(OperatingSystem::Linux, Architecture::X64)
    }

    fn touch(path: &Path, executable: bool) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = if executable { 0o755 } else { 0o644 };
            fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
        }
        #[cfg(not(unix))]
        let _ = executable;
    }

    #[test]
    fn finds_nested_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("jextract-22/bin/jextract");
        touch(&exe, true);
        touch(&dir.path().join("jextract-22/runtime/bin/java"), true);

        assert_eq!(locate(dir.path(), linux()).unwrap(), exe);
    }

    #[test]
    fn empty_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate(dir.path(), linux()).unwrap_err();
        assert!(matches!(err, LocateError::NotFound { name: "jextract", .. }));
    }

    #[test]
    fn missing_root_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate(&dir.path().join("absent"), linux()).unwrap_err();
        assert!(matches!(err, LocateError::NotFound { .. }));
    }

    #[test]
    fn launcher_outside_bin_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("jextract-22/lib/jextract"), true);
        assert!(locate(dir.path(), linux()).is_err());
    }

    #[test]
    fn two_launchers_are_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a/bin/jextract"), true);
        touch(&dir.path().join("b/bin/jextract"), true);

        match locate(dir.path(), linux()).unwrap_err() {
            LocateError::Ambiguous { matches, .. } => assert_eq!(matches.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("old/bin/jextract"), false);
        let exe = dir.path().join("new/bin/jextract");
        touch(&exe, true);

        assert_eq!(locate(dir.path(), linux()).unwrap(), exe);
    }

    #[test]
    fn windows_uses_batch_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let bat = dir.path().join("jextract-22/bin/jextract.bat");
        touch(&bat, true);
        touch(&dir.path().join("jextract-22/bin/jextract"), true);

        let windows = Platform::new(OperatingSystem::Windows, Architecture::X64);
        assert_eq!(locate(dir.path(), windows).unwrap(), bat);
    }
}
