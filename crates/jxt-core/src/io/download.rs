//! Distribution download with streaming checksum verification.
//!
//! The archive is hashed while it is written, so a corrupted or tampered
//! download is detected without reading the file a second time. A file that
//! fails verification never survives on disk.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use jxt_schema::{Checksum, Resource};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::Reporter;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const VERIFY_BUFFER: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Download of {url} failed with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    Integrity {
        url: String,
        expected: String,
        actual: String,
    },
}

/// HTTP client for distribution archives.
#[derive(Debug, Clone)]
pub struct DownloadClient {
    client: Client,
}

impl DownloadClient {
    /// A client with a 10 second connect timeout and no overall timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Http`] if the TLS backend cannot be
    /// initialised.
    pub fn new() -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(crate::USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Whether the file at `path` exists and hashes to the resource's checksum.
    pub async fn verify(resource: &Resource, path: &Path) -> Result<bool, DownloadError> {
        let mut file = match File::open(path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let mut digest = resource.algorithm.hasher();
        let mut buffer = vec![0u8; VERIFY_BUFFER];
        loop {
            let n = file.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            digest.update(&buffer[..n]);
        }
        Ok(digest.finalize() == resource.checksum)
    }

    /// Download `resource` to `target`, verifying it on the fly.
    ///
    /// An existing file at `target` that already verifies is reused without
    /// any network request; one that does not is replaced.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Status`] if the server answers with anything but 200.
    /// - [`DownloadError::Integrity`] if the digest does not match. `target`
    ///   has been removed by the time this is returned.
    /// - [`DownloadError::Http`] / [`DownloadError::Io`] for transport and
    ///   filesystem failures.
    pub async fn fetch(
        &self,
        resource: &Resource,
        target: &Path,
        reporter: &dyn Reporter,
    ) -> Result<Checksum, DownloadError> {
        if target.exists() {
            if Self::verify(resource, target).await? {
                debug!(path = %target.display(), "archive already present and verified");
                return Ok(resource.checksum.clone());
            }
            warn!(path = %target.display(), "cached archive failed verification, downloading again");
            tokio::fs::remove_file(target).await?;
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!(url = %resource.url, "downloading");
        let response = self.client.get(&resource.url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(DownloadError::Status {
                url: resource.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let actual = match stream_to_file(resource, response, target, reporter).await {
            Ok(actual) => actual,
            Err(e) => {
                discard(target).await;
                return Err(e);
            }
        };

        if actual != resource.checksum {
            discard(target).await;
            reporter.failed(&resource.url, "checksum mismatch");
            return Err(DownloadError::Integrity {
                url: resource.url.clone(),
                expected: resource.checksum.to_string(),
                actual: actual.to_string(),
            });
        }

        debug!(path = %target.display(), checksum = %actual, "download verified");
        Ok(actual)
    }
}

async fn stream_to_file(
    resource: &Resource,
    response: reqwest::Response,
    target: &Path,
    reporter: &dyn Reporter,
) -> Result<Checksum, DownloadError> {
    let total = response.content_length();
    reporter.downloading(resource, 0, total);

    let mut file = File::create(target).await?;
    let mut stream = response.bytes_stream();
    let mut digest = resource.algorithm.hasher();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        digest.update(&chunk);
        downloaded += chunk.len() as u64;
        reporter.downloading(resource, downloaded, total);
    }

    file.flush().await?;
    Ok(digest.finalize())
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove rejected download");
        }
    }
}
