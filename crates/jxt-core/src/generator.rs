//! Generate bindings for many libraries against a shared installation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::command::{compile, compile_dump_includes};
use crate::error::{Error, SharedError};
use crate::exec::run;
use crate::manifest::LibraryConfig;
use crate::reporter::Reporter;
use crate::store::{InstallationSource, InstallationStore};

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub library: String,
    pub output: PathBuf,
    pub tool_version: u32,
    pub args: Vec<String>,
}

/// Result for one library of a batch.
#[derive(Debug)]
pub struct LibraryOutcome {
    pub library: String,
    pub result: Result<GenerationReport, SharedError>,
}

/// Drives jextract for a set of libraries.
#[derive(Debug, Clone)]
pub struct Generator {
    store: Arc<InstallationStore>,
    jobs: usize,
}

impl Generator {
    /// A generator running up to one invocation per CPU at a time.
    pub fn new(store: Arc<InstallationStore>) -> Self {
        Self {
            store,
            jobs: num_cpus::get(),
        }
    }

    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn store(&self) -> &InstallationStore {
        &self.store
    }

    /// Generate bindings for one library.
    ///
    /// # Errors
    ///
    /// Fails if the installation cannot be provided, the output directory
    /// cannot be created, or jextract exits non-zero.
    pub async fn generate(
        &self,
        source: &InstallationSource,
        library: &LibraryConfig,
    ) -> Result<GenerationReport, SharedError> {
        let installation = self.store.install(source).await?;
        let reporter = self.store.reporter();
        reporter.generating(&library.name);

        tokio::fs::create_dir_all(&library.output)
            .await
            .map_err(|e| Arc::new(Error::from(e)))?;

        let args = compile(library, installation.version);
        run(&installation.executable, &args)
            .await
            .map_err(|e| Arc::new(Error::from(e)))?;

        reporter.done(&library.name, &library.output.display().to_string());
        Ok(GenerationReport {
            library: library.name.clone(),
            output: library.output.clone(),
            tool_version: installation.version,
            args,
        })
    }

    /// Generate bindings for every library.
    ///
    /// The installation is resolved once and shared. Libraries run
    /// concurrently; one library failing does not stop the others. Outcomes
    /// are returned in input order.
    pub async fn generate_all(
        &self,
        source: &InstallationSource,
        libraries: &[LibraryConfig],
    ) -> Vec<LibraryOutcome> {
        info!(count = libraries.len(), jobs = self.jobs, %source, "generating bindings");
        let reporter = self.store.reporter();

        stream::iter(libraries)
            .map(|library| {
                let reporter = Arc::clone(&reporter);
                async move {
                    let result = self.generate(source, library).await;
                    if let Err(e) = &result {
                        warn!(library = %library.name, error = %e, "generation failed");
                        reporter.failed(&library.name, &e.to_string());
                    }
                    LibraryOutcome {
                        library: library.name.clone(),
                        result,
                    }
                }
            })
            .buffered(self.jobs)
            .collect()
            .await
    }

    /// Write the `--include-*` lines for every symbol in the library's
    /// header to `arg_file`.
    pub async fn dump_includes(
        &self,
        source: &InstallationSource,
        library: &LibraryConfig,
        arg_file: &Path,
    ) -> Result<PathBuf, SharedError> {
        let installation = self.store.install(source).await?;
        if let Some(parent) = arg_file.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Arc::new(Error::from(e)))?;
        }

        let args = compile_dump_includes(library, arg_file);
        run(&installation.executable, &args)
            .await
            .map_err(|e| Arc::new(Error::from(e)))?;

        info!(library = %library.name, path = %arg_file.display(), "dumped includes");
        Ok(arg_file.to_path_buf())
    }
}
