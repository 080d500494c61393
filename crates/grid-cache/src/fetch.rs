//! Transfer of a single grid file into the cache.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transfer of {0} timed out")]
    Timeout(String),
}

/// Where a file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    Http(String),
    File(PathBuf),
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchTarget::Http(url) => write!(f, "{}", url),
            FetchTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Copies one file from a source to a local path.
///
/// Implementations must either leave `dest` complete or not create it.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, target: &FetchTarget, dest: &Path) -> Result<(), FetchError>;
}

/// HTTP GET or local file copy, bounded by a timeout.
pub struct SourceFetcher {
    client: Client,
    timeout: Duration,
}

impl SourceFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(30)))
            .build()?;
        Ok(Self { client, timeout })
    }

    /// Stream an HTTP response body into `path`; returns bytes written.
    async fn download(&self, url: &str, path: &Path) -> Result<u64, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let mut file = fs::File::create(path).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }

    async fn copy(&self, source: &Path, path: &Path) -> Result<u64, FetchError> {
        tokio::time::timeout(self.timeout, fs::copy(source, path))
            .await
            .map_err(|_| FetchError::Timeout(source.display().to_string()))?
            .map_err(FetchError::from)
    }
}

#[async_trait]
impl Fetcher for SourceFetcher {
    #[instrument(skip(self), fields(target = %target))]
    async fn fetch(&self, target: &FetchTarget, dest: &Path) -> Result<(), FetchError> {
        let partial = partial_path(dest);
        debug!(partial = %partial.display(), "Starting transfer");

        let result = match target {
            FetchTarget::Http(url) => self.download(url, &partial).await,
            FetchTarget::File(source) => self.copy(source, &partial).await,
        };

        match result {
            Ok(bytes) => {
                fs::rename(&partial, dest).await?;
                info!(bytes, path = %dest.display(), "Cached grid file");
                Ok(())
            }
            Err(e) => {
                fs::remove_file(&partial).await.ok();
                Err(e)
            }
        }
    }
}

/// Sibling of `dest` used while a transfer is in flight.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    dest.with_file_name(name)
}
