//! Resolve command

use std::path::Path;

use anyhow::Result;
use jxt_core::Catalog;

use crate::context::Context;

/// Print the distribution a Java version maps to on the target platform.
pub async fn resolve(ctx: &Context, manifest_path: &Path, java_version: u32) -> Result<()> {
    let manifest = ctx.project_manifest(manifest_path).await?;
    let catalog = ctx.catalog(manifest.as_ref())?;
    let resource = catalog.resolve(java_version, ctx.platform)?;

    println!("version   {}", Catalog::tool_version(java_version));
    println!("platform  {}", ctx.platform);
    println!("url       {}", resource.url);
    println!("{:<9} {}", resource.algorithm.as_str().to_lowercase(), resource.checksum);
    println!("archive   {}", ctx.layout.archive(resource.file_name()).display());
    Ok(())
}
