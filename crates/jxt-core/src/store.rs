//! Installation store.
//!
//! Turns an [`InstallationSource`] into a ready-to-run [`Installation`]. Remote
//! sources are resolved through the catalog, downloaded, verified and
//! extracted into `<cache>/installation/<version>`; local sources are located
//! and probed in place.
//!
//! Every key is installed at most once per store. Concurrent callers asking
//! for the same key wait on the same [`OnceCell`] and receive the same
//! `Arc<Installation>`, or the same error. A per-key lock serialises the
//! install work with [`InstallationStore::uninstall`], so the cache
//! directories of one key are never written by two tasks at once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use jxt_schema::{Platform, Resource};
use tokio::sync::{Mutex as AsyncMutex, OnceCell};
use tracing::{debug, info, instrument};

use crate::catalog::Catalog;
use crate::error::{Error, SharedError};
use crate::io::download::DownloadClient;
use crate::io::extract::extract_clean;
use crate::locate::locate;
use crate::paths::CacheLayout;
use crate::probe::VersionProbe;
use crate::reporter::{NullReporter, Reporter};

/// Where a jextract installation comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallationSource {
    /// Download the release matching a Java runtime version.
    Remote { runtime_version: u32 },
    /// Use an existing installation directory.
    Local { path: PathBuf },
}

impl std::fmt::Display for InstallationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote { runtime_version } => write!(f, "java {runtime_version}"),
            Self::Local { path } => write!(f, "{}", path.display()),
        }
    }
}

/// How an installation got onto disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Extracted from a downloaded archive.
    Downloaded { resource: Resource, archive: PathBuf },
    /// Provided by the user.
    Local,
}

/// A jextract installation ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    /// Directory the installation lives in.
    pub root: PathBuf,
    /// The launcher inside `root`.
    pub executable: PathBuf,
    /// jextract feature release.
    pub version: u32,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum InstallKey {
    Remote(u32),
    Local(PathBuf),
}

impl From<&InstallationSource> for InstallKey {
    fn from(source: &InstallationSource) -> Self {
        match source {
            InstallationSource::Remote { runtime_version } => {
                Self::Remote(Catalog::tool_version(*runtime_version))
            }
            InstallationSource::Local { path } => Self::Local(path.clone()),
        }
    }
}

type InstallResult = Result<Arc<Installation>, SharedError>;

/// Long-lived, shareable installer with per-key memoization.
pub struct InstallationStore {
    layout: CacheLayout,
    catalog: Catalog,
    platform: Platform,
    client: DownloadClient,
    probe: VersionProbe,
    reporter: Arc<dyn Reporter>,
    entries: Mutex<HashMap<InstallKey, Arc<OnceCell<InstallResult>>>>,
    locks: Mutex<HashMap<InstallKey, Arc<AsyncMutex<()>>>>,
}

impl std::fmt::Debug for InstallationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationStore")
            .field("cache", &self.layout.root())
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl InstallationStore {
    /// A store caching under `cache_root` for the current platform.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(cache_root: impl Into<PathBuf>, catalog: Catalog) -> Result<Self, Error> {
        Ok(Self {
            layout: CacheLayout::new(cache_root),
            catalog,
            platform: Platform::current(),
            client: DownloadClient::new()?,
            probe: VersionProbe::new(),
            reporter: Arc::new(NullReporter),
            entries: Mutex::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Resolve distributions for `platform` instead of the host.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: DownloadClient) -> Self {
        self.client = client;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    pub fn reporter(&self) -> Arc<dyn Reporter> {
        Arc::clone(&self.reporter)
    }

    /// Install `source`, or return the installation made earlier for the
    /// same key.
    ///
    /// The first caller for a key performs the work; concurrent callers wait
    /// for it. A failure is remembered and returned to every later caller.
    pub async fn install(&self, source: &InstallationSource) -> InstallResult {
        let key = InstallKey::from(source);
        if let Some(result) = self.cell(&key).get() {
            return result.clone();
        }

        let lock = self.lock(&key);
        let _guard = lock.lock().await;
        // uninstall may have replaced the cell while we waited
        let cell = self.cell(&key);
        cell.get_or_init(|| async {
            self.install_uncached(&key)
                .await
                .map(Arc::new)
                .map_err(Arc::new)
        })
        .await
        .clone()
    }

    fn cell(&self, key: &InstallKey) -> Arc<OnceCell<InstallResult>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key.clone()).or_default())
    }

    fn lock(&self, key: &InstallKey) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.clone()).or_default())
    }

    async fn install_uncached(&self, key: &InstallKey) -> Result<Installation, Error> {
        let installation = match key {
            InstallKey::Remote(version) => self.install_remote(*version).await?,
            InstallKey::Local(path) => self.install_local(path).await?,
        };
        self.reporter.installed(&installation);
        Ok(installation)
    }

    #[instrument(skip(self), fields(platform = %self.platform))]
    async fn install_remote(&self, version: u32) -> Result<Installation, Error> {
        let resource = self.catalog.resolve(version, self.platform)?;
        let archive = self.layout.archive(resource.file_name());
        info!(url = %resource.url, "installing jextract {version}");

        self.client
            .fetch(&resource, &archive, self.reporter.as_ref())
            .await?;

        let root = self.layout.installation(version);
        self.reporter.extracting(version, &root);

        let platform = self.platform;
        let (archive_path, dest) = (archive.clone(), root.clone());
        let executable = tokio::task::spawn_blocking(move || -> Result<PathBuf, Error> {
            extract_clean(&archive_path, &dest)?;
            Ok(locate(&dest, platform)?)
        })
        .await
        .map_err(std::io::Error::other)??;

        debug!(executable = %executable.display(), "jextract {version} installed");
        Ok(Installation {
            root,
            executable,
            version,
            origin: Origin::Downloaded { resource, archive },
        })
    }

    #[instrument(skip(self))]
    async fn install_local(&self, path: &Path) -> Result<Installation, Error> {
        let platform = self.platform;
        let root = path.to_path_buf();
        let executable = tokio::task::spawn_blocking(move || locate(&root, platform))
            .await
            .map_err(std::io::Error::other)??;
        let version = self.probe.probe(&executable).await?;

        info!(version, executable = %executable.display(), "using local jextract");
        Ok(Installation {
            root: path.to_path_buf(),
            executable,
            version,
            origin: Origin::Local,
        })
    }

    /// Remove the downloaded installation for a runtime version.
    ///
    /// Deletes the extracted directory and the archive and forgets the
    /// memoized result, so the next `install` starts over. An install of the
    /// same version that is still running is waited for first; one started
    /// afterwards waits until the files are gone. Returns whether anything
    /// was removed.
    pub async fn uninstall(&self, runtime_version: u32) -> Result<bool, Error> {
        let version = Catalog::tool_version(runtime_version);
        let key = InstallKey::Remote(version);
        let lock = self.lock(&key);
        let _guard = lock.lock().await;

        let cell = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);

        let mut removed = false;
        if let Some(Ok(installation)) = cell.as_ref().and_then(|c| c.get()) {
            if let Origin::Downloaded { archive, .. } = &installation.origin {
                removed |= remove_file_if_exists(archive).await?;
            }
        }
        removed |= remove_dir_if_exists(&self.layout.installation(version)).await?;

        if removed {
            info!(version, "uninstalled jextract");
        }
        Ok(removed)
    }

    /// Uninstall every remote installation this store made.
    pub async fn clean(&self) -> Result<usize, Error> {
        let versions: Vec<u32> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter_map(|key| match key {
                InstallKey::Remote(version) => Some(*version),
                InstallKey::Local(_) => None,
            })
            .collect();

        let mut count = 0;
        for version in versions {
            if self.uninstall(version).await? {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Delete the whole download and installation cache under `layout`.
pub async fn purge(layout: &CacheLayout) -> Result<bool, Error> {
    let downloads = remove_dir_if_exists(&layout.downloads()).await?;
    let installations = remove_dir_if_exists(&layout.installations()).await?;
    Ok(downloads || installations)
}

async fn remove_dir_if_exists(path: &Path) -> Result<bool, Error> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

async fn remove_file_if_exists(path: &Path) -> Result<bool, Error> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
