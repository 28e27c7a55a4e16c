//! Generate command

use std::path::Path;

use anyhow::{Result, bail};
use jxt_core::{Generator, LibraryConfig, Reporter};

use crate::context::Context;

/// Generate bindings for `names`, or for every library when empty.
pub async fn generate(
    ctx: &Context,
    manifest_path: &Path,
    names: &[String],
    jobs: Option<usize>,
) -> Result<()> {
    let manifest = ctx.manifest(manifest_path).await?;
    let libraries: Vec<LibraryConfig> = if names.is_empty() {
        manifest.libraries()?
    } else {
        names
            .iter()
            .map(|name| manifest.library(name))
            .collect::<Result<_, _>>()?
    };

    if libraries.is_empty() {
        ctx.reporter
            .warning(&format!("{} declares no libraries", manifest_path.display()));
        return Ok(());
    }

    let store = ctx.store(ctx.catalog(Some(&manifest))?)?;
    let mut generator = Generator::new(store);
    if let Some(jobs) = jobs {
        generator = generator.with_jobs(jobs);
    }

    let source = manifest.source()?;
    ctx.reporter.section(&format!("Generating with jextract for {source}"));
    let outcomes = generator.generate_all(&source, &libraries).await;

    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| o.result.is_err())
        .map(|o| o.library.as_str())
        .collect();
    for outcome in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
        println!("{}", outcome.output.display());
    }

    if !failed.is_empty() {
        bail!(
            "{} of {} libraries failed: {}",
            failed.len(),
            outcomes.len(),
            failed.join(", ")
        );
    }
    Ok(())
}
