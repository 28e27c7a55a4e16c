//! Dump-includes command

use std::path::{Path, PathBuf};

use anyhow::Result;
use jxt_core::Generator;

use crate::context::Context;

/// Write the full symbol list of one library's header to an arg file.
pub async fn dump_includes(
    ctx: &Context,
    manifest_path: &Path,
    name: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let manifest = ctx.manifest(manifest_path).await?;
    let library = manifest.library(name)?;
    let arg_file = output.unwrap_or_else(|| manifest.dump_includes_path(name));

    let store = ctx.store(ctx.catalog(Some(&manifest))?)?;
    let written = Generator::new(store)
        .dump_includes(&manifest.source()?, &library, &arg_file)
        .await?;

    println!("{}", written.display());
    Ok(())
}
