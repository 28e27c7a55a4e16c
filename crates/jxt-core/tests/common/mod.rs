#![allow(dead_code)]

use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use jxt_schema::{Architecture, ChecksumAlgorithm, OperatingSystem, Platform};

/// Shell launcher that behaves enough like jextract for tests.
///
/// `--version` prints a banner. Otherwise the arguments are written one per
/// line to `<output>/args.txt`; `--dump-includes <file>` writes a single
/// include line; a header named `broken.h` fails with exit code 1.
pub fn fake_jextract(version: u32) -> String {
    format!(
        r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "jextract {version}"
  echo "JDK version {version}+35-2369"
  exit 0
fi
out=""
prev=""
last=""
for a in "$@"; do
  if [ "$prev" = "--output" ]; then out="$a"; fi
  if [ "$prev" = "--dump-includes" ]; then echo "--include-function f" > "$a"; fi
  prev="$a"
  last="$a"
done
case "$last" in
  *broken.h) echo "fatal error: 'broken.h' file not found" >&2; exit 1 ;;
esac
if [ -n "$out" ]; then printf '%s\n' "$@" > "$out/args.txt"; fi
"#
    )
}

/// An in-memory `.tar.gz` laid out like a jextract release.
pub fn distribution_tar_gz(version: u32) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let launcher = fake_jextract(version);
    let mut header = tar::Header::new_gnu();
    header.set_size(launcher.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder
        .append_data(
            &mut header,
            format!("jextract-{version}/bin/jextract"),
            launcher.as_bytes(),
        )
        .unwrap();

    let conf = b"-Xss1m\n";
    let mut header = tar::Header::new_gnu();
    header.set_size(conf.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, format!("jextract-{version}/conf/jextract.conf"), &conf[..])
        .unwrap();

    builder.into_inner().unwrap().finish().unwrap()
}

pub fn sha256(bytes: &[u8]) -> String {
    let mut digest = ChecksumAlgorithm::Sha256.hasher();
    digest.update(bytes);
    digest.finalize_hex()
}

pub fn linux_x64() -> Platform {
    Platform::new(OperatingSystem::Linux, Architecture::X64)
}

/// Catalog text pointing version 22 for linux-x64 at `url`.
pub fn catalog_for(url: &str, checksum: &str) -> String {
    format!("jextract.22.linux.x64.url={url}\njextract.22.linux.x64.sha-256={checksum}\n")
}

/// Write an executable fake jextract at `<root>/bin/jextract`.
#[cfg(unix)]
pub fn local_installation(root: &Path, version: u32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let exe = root.join("bin/jextract");
    std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
    std::fs::write(&exe, fake_jextract(version)).unwrap();
    std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
    exe
}
