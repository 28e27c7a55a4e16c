//! Archive extraction module
//!
//! Handles tar.gz, tar.zst, tar and zip distributions. Extraction is
//! blocking; async callers run it on the blocking pool.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path};

use jxt_schema::ArchiveFormat;
use thiserror::Error;
use zip::ZipArchive;
use zstd::stream::Decoder as ZstdDecoder;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("Archive error: {0}")]
    Archive(String),
}

/// Extract a tar.zst archive to a destination directory
pub fn extract_tar_zst(archive_path: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
    let file = File::open(archive_path)?;
    let zstd_decoder = ZstdDecoder::new(BufReader::new(file))?;
    extract_tar(zstd_decoder, dest_dir)
}

/// Extract a tar.gz archive to a destination directory
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
    let file = File::open(archive_path)?;
    let gz_decoder = flate2::read::GzDecoder::new(BufReader::new(file));
    extract_tar(gz_decoder, dest_dir)
}

/// Extract a tar archive from a reader
fn extract_tar<R: Read>(reader: R, dest_dir: &Path) -> Result<(), ExtractError> {
    fs::create_dir_all(dest_dir)?;

    let mut archive = tar::Archive::new(reader);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let relative_path = entry.path()?.into_owned();

        if !is_contained(&relative_path) {
            return Err(ExtractError::Archive(format!(
                "Invalid path in archive: {}",
                relative_path.display()
            )));
        }

        // unpack_in creates parent directories and refuses to write outside dest_dir
        if !entry.unpack_in(dest_dir)? {
            return Err(ExtractError::Archive(format!(
                "Refused to unpack {}",
                relative_path.display()
            )));
        }
    }

    Ok(())
}

/// Extract a zip archive
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| ExtractError::Archive(e.to_string()))?;

    fs::create_dir_all(dest_dir)?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| ExtractError::Archive(e.to_string()))?;
        let Some(relative_path) = file.enclosed_name() else {
            return Err(ExtractError::Archive(format!(
                "Invalid path in archive: {}",
                file.name()
            )));
        };

        let absolute_path = dest_dir.join(&relative_path);
        if file.is_dir() {
            fs::create_dir_all(&absolute_path)?;
            continue;
        }
        if let Some(p) = absolute_path.parent() {
            fs::create_dir_all(p)?;
        }

        let mut outfile = File::create(&absolute_path)?;
        io::copy(&mut file, &mut outfile)?;

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&absolute_path, fs::Permissions::from_mode(mode))?;
        }
    }

    Ok(())
}

/// Extract an archive, detecting the format from its file name.
///
/// # Errors
///
/// Returns [`ExtractError::UnsupportedFormat`] for anything that is not a
/// tar.gz, tar.zst, tar or zip file.
pub fn extract_auto(archive_path: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
    let name = archive_path.to_string_lossy();
    match ArchiveFormat::detect(&name) {
        Some(ArchiveFormat::TarZst) => extract_tar_zst(archive_path, dest_dir),
        Some(ArchiveFormat::TarGz) => extract_tar_gz(archive_path, dest_dir),
        Some(ArchiveFormat::Tar) => {
            let file = File::open(archive_path)?;
            extract_tar(BufReader::new(file), dest_dir)
        }
        Some(ArchiveFormat::Zip) => extract_zip(archive_path, dest_dir),
        None => Err(ExtractError::UnsupportedFormat(name.into_owned())),
    }
}

/// Replace `dest_dir` with the contents of `archive_path`.
///
/// Whatever was at `dest_dir` before is deleted first, so the result never
/// mixes files from two extractions. If unpacking fails, the partial tree is
/// removed as well.
pub fn extract_clean(archive_path: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
    if dest_dir.exists() {
        fs::remove_dir_all(dest_dir)?;
    }
    let result = extract_auto(archive_path, dest_dir);
    if result.is_err() && dest_dir.exists() {
        // the extraction error is the one worth reporting
        let _ = fs::remove_dir_all(dest_dir);
    }
    result
}

fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::tempdir;

    fn append_file<W: Write>(builder: &mut tar::Builder<W>, path: &str, body: &[u8], mode: u32) {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(mode);
        header.set_cksum();
        builder.append_data(&mut header, path, body).unwrap();
    }

    fn write_tar_gz(path: &Path) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        append_file(&mut builder, "jextract-22/bin/jextract", b"#!/bin/sh\necho jextract 22\n", 0o755);
        append_file(&mut builder, "jextract-22/conf/jextract.conf", b"x", 0o644);
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_extract_tar_gz() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("jextract.tar.gz");
        write_tar_gz(&archive);

        let dest = dir.path().join("out");
        extract_auto(&archive, &dest).unwrap();

        let launcher = dest.join("jextract-22/bin/jextract");
        assert!(launcher.is_file());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&launcher).unwrap().permissions().mode();
            assert_ne!(mode & 0o111, 0);
        }
        assert!(dest.join("jextract-22/conf/jextract.conf").is_file());
    }

    #[test]
    fn test_extract_zip() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("jextract.zip");
        {
            let mut zip = zip::ZipWriter::new(File::create(&archive).unwrap());
            let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
            zip.start_file("jextract-22/bin/jextract.bat", options).unwrap();
            zip.write_all(b"@echo off").unwrap();
            zip.finish().unwrap();
        }

        let dest = dir.path().join("out");
        extract_auto(&archive, &dest).unwrap();
        assert!(dest.join("jextract-22/bin/jextract.bat").is_file());
    }

    #[test]
    fn test_extract_clean_replaces_previous_contents() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("jextract.tar.gz");
        write_tar_gz(&archive);

        let dest = dir.path().join("22");
        fs::create_dir_all(dest.join("stale")).unwrap();
        fs::write(dest.join("stale/file"), "old").unwrap();

        extract_clean(&archive, &dest).unwrap();
        assert!(!dest.join("stale").exists());
        assert!(dest.join("jextract-22/bin/jextract").is_file());
    }

    #[test]
    fn test_extract_clean_removes_partial_tree_on_failure() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("jextract.tar.gz");
        write_tar_gz(&archive);
        let bytes = fs::read(&archive).unwrap();
        fs::write(&archive, &bytes[..bytes.len() / 2]).unwrap();

        let dest = dir.path().join("22");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("previous"), "old").unwrap();

        assert!(extract_clean(&archive, &dest).is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn test_unsupported_format() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("jextract.dmg");
        fs::write(&src, b"not an archive").unwrap();

        let err = extract_auto(&src, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_corrupt_archive() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("jextract.zip");
        fs::write(&src, b"definitely not a zip").unwrap();

        let err = extract_auto(&src, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, ExtractError::Archive(_)));
    }

    #[test]
    fn test_path_containment() {
        assert!(is_contained(Path::new("jextract-22/bin/jextract")));
        assert!(is_contained(Path::new("./bin/jextract")));
        assert!(!is_contained(Path::new("../escape")));
        assert!(!is_contained(Path::new("/etc/passwd")));
    }
}
