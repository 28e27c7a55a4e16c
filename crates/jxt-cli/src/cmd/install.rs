//! Install command

use std::path::{Path, PathBuf};

use anyhow::Result;
use jxt_core::InstallationSource;

use crate::context::Context;

/// Install jextract for a Java version, a local directory, or whatever the
/// manifest asks for, and print the executable path.
pub async fn install(
    ctx: &Context,
    manifest_path: &Path,
    java_version: Option<u32>,
    local: Option<PathBuf>,
) -> Result<()> {
    let (source, manifest) = match (java_version, local) {
        (Some(runtime_version), _) => (InstallationSource::Remote { runtime_version }, None),
        (None, Some(path)) => (InstallationSource::Local { path }, None),
        (None, None) => {
            let manifest = ctx.manifest(manifest_path).await?;
            (manifest.source()?, Some(manifest))
        }
    };

    let store = ctx.store(ctx.catalog(manifest.as_ref())?)?;
    let installation = store.install(&source).await?;
    println!("{}", installation.executable.display());
    Ok(())
}
