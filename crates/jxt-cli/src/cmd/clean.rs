//! Clean command

use std::path::Path;

use anyhow::Result;
use jxt_core::store::purge;
use jxt_core::{Catalog, Reporter};

use crate::context::Context;

/// Remove the whole cache, or one version's archive and installation.
pub async fn clean(ctx: &Context, manifest_path: &Path, java_version: Option<u32>) -> Result<()> {
    let removed = match java_version {
        None => purge(&ctx.layout).await?,
        Some(java_version) => {
            let version = Catalog::tool_version(java_version);
            let mut removed = remove(&ctx.layout.installation(version)).await?;
            // The archive name comes from the catalog; an unknown entry simply
            // has nothing to delete.
            let manifest = ctx.project_manifest(manifest_path).await?;
            if let Ok(resource) = ctx.catalog(manifest.as_ref())?.resolve(version, ctx.platform) {
                removed |= remove(&ctx.layout.archive(resource.file_name())).await?;
            }
            removed
        }
    };

    if removed {
        ctx.reporter.info("Cache cleaned.");
    } else {
        ctx.reporter.info("Nothing to clean.");
    }
    Ok(())
}

async fn remove(path: &Path) -> Result<bool> {
    let result = if path.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
