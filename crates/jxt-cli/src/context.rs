//! Shared command context.
//!
//! Groups the settings every command derives from global flags so they are
//! resolved once in `main`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use jxt_core::paths::CacheLayout;
use jxt_core::{Catalog, InstallationStore, Manifest};
use jxt_schema::Platform;
use tracing::debug;

use crate::Cli;
use crate::ui::TerminalReporter;

#[derive(Debug, Clone)]
pub struct Context {
    pub layout: CacheLayout,
    pub catalog_override: Option<PathBuf>,
    pub platform: Platform,
    pub reporter: Arc<TerminalReporter>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        let layout = cli
            .cache
            .clone()
            .map_or_else(CacheLayout::default, CacheLayout::new);
        let platform = cli.target_platform();
        debug!(cache = %layout.root().display(), %platform, "context");

        Self {
            layout,
            catalog_override: cli.catalog.clone(),
            platform,
            reporter: Arc::new(TerminalReporter::new()),
        }
    }

    /// Load and validate the project manifest.
    pub async fn manifest(&self, path: &Path) -> Result<Manifest> {
        Manifest::load(path)
            .await
            .with_context(|| format!("Failed to load manifest {}", path.display()))
    }

    /// The manifest at `path` if there is one.
    ///
    /// A missing file is not an error; an unreadable or invalid one is.
    pub async fn project_manifest(&self, path: &Path) -> Result<Option<Manifest>> {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            self.manifest(path).await.map(Some)
        } else {
            debug!(path = %path.display(), "no manifest, using the built-in catalog");
            Ok(None)
        }
    }

    /// The catalog, with the command-line override taking precedence over the
    /// manifest's.
    pub fn catalog(&self, manifest: Option<&Manifest>) -> Result<Catalog> {
        let path = self
            .catalog_override
            .clone()
            .or_else(|| manifest.and_then(Manifest::catalog_path));
        Catalog::load(path.as_deref()).context("Failed to load distribution catalog")
    }

    /// An installation store over the cache for the target platform.
    pub fn store(&self, catalog: Catalog) -> Result<Arc<InstallationStore>> {
        let store = InstallationStore::new(self.layout.root(), catalog)
            .context("Failed to initialise HTTP client")?
            .with_platform(self.platform)
            .with_reporter(self.reporter.clone());
        Ok(Arc::new(store))
    }
}
