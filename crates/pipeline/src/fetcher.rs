//! Download of source videos into the scratch directory.
//!
//! [`VideoFetcher`] issues a single GET per request, streams the body to a
//! fresh scratch file, and guarantees that no file or directory it created is
//! left behind when the download fails.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;

use crate::error::DownloadError;
use crate::scratch::VideoAsset;

// ---------------------------------------------------------------------------
// VideoFetcher
// ---------------------------------------------------------------------------

/// Fetches videos over HTTP(S).
pub struct VideoFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: Option<u64>,
}

impl VideoFetcher {
    /// Create a fetcher whose requests time out after `timeout`.
    ///
    /// The timeout covers the whole transfer, body included.
    pub fn new(timeout: Duration, max_bytes: Option<u64>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            timeout,
            max_bytes,
        }
    }

    /// Download `url` to `dest`.
    ///
    /// Missing parent directories of `dest` are created. On any failure the
    /// partial file and every directory this call created are removed.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<VideoAsset, DownloadError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus(status.as_u16()));
        }

        if let (Some(limit), Some(len)) = (self.max_bytes, response.content_length()) {
            if len > limit {
                return Err(DownloadError::TooLarge { limit });
            }
        }

        // Nothing touches the disk until the first byte has arrived.
        let first = loop {
            match response.chunk().await.map_err(|e| self.classify(e))? {
                Some(chunk) if chunk.is_empty() => continue,
                Some(chunk) => break chunk,
                None => return Err(DownloadError::Empty),
            }
        };

        let created_dir = topmost_missing_dir(dest).await?;
        let file = match create_file(dest).await {
            Ok(file) => file,
            Err(e) => {
                // `dest` is not ours; only the directories made for it go.
                remove_created_dirs(dest, created_dir.as_deref()).await;
                return Err(e);
            }
        };

        match self.write_body(file, &mut response, &first).await {
            Ok(size) => {
                tracing::debug!(url, path = %dest.display(), size, "Video downloaded");
                Ok(VideoAsset::new(url, dest.to_path_buf(), size))
            }
            Err(e) => {
                cleanup_partial(dest, created_dir.as_deref()).await;
                Err(e)
            }
        }
    }

    async fn write_body(
        &self,
        mut file: tokio::fs::File,
        response: &mut reqwest::Response,
        first: &[u8],
    ) -> Result<u64, DownloadError> {
        let mut written = self.account(0, first.len())?;
        file.write_all(first).await?;

        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            written = self.account(written, chunk.len())?;
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(written)
    }

    /// Add `len` to the running byte count, enforcing the size limit.
    fn account(&self, written: u64, len: usize) -> Result<u64, DownloadError> {
        let total = written + len as u64;
        match self.max_bytes {
            Some(limit) if total > limit => Err(DownloadError::TooLarge { limit }),
            _ => Ok(total),
        }
    }

    fn classify(&self, err: reqwest::Error) -> DownloadError {
        if err.is_timeout() {
            DownloadError::Timeout(self.timeout)
        } else {
            DownloadError::Request(err)
        }
    }
}

// ---------------------------------------------------------------------------
// Filesystem helpers
// ---------------------------------------------------------------------------

/// The topmost ancestor of `dest` that does not exist yet, if any.
async fn topmost_missing_dir(dest: &Path) -> Result<Option<PathBuf>, DownloadError> {
    let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(None);
    };

    let mut topmost = None;
    let mut cursor = Some(parent);
    while let Some(dir) = cursor {
        if dir.as_os_str().is_empty() || tokio::fs::try_exists(dir).await? {
            break;
        }
        topmost = Some(dir.to_path_buf());
        cursor = dir.parent();
    }
    Ok(topmost)
}

/// Create the parent directories of `dest`, then `dest` itself.
///
/// Fails with `AlreadyExists` rather than reuse a file this call did not make.
async fn create_file(dest: &Path) -> Result<tokio::fs::File, DownloadError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .await?;
    Ok(file)
}

/// Remove a partial download and the directories created for it.
async fn cleanup_partial(dest: &Path, created_dir: Option<&Path>) {
    if let Err(e) = tokio::fs::remove_file(dest).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %dest.display(), error = %e, "Failed to remove partial download");
        }
    }
    remove_created_dirs(dest, created_dir).await;
}

/// Remove the directories between `dest` and `created_dir`, inclusive.
///
/// Directories are removed innermost first and only while empty, so a
/// concurrent request sharing the directory keeps its files.
async fn remove_created_dirs(dest: &Path, created_dir: Option<&Path>) {
    let Some(top) = created_dir else {
        return;
    };
    let mut cursor = dest.parent();
    while let Some(dir) = cursor {
        if tokio::fs::remove_dir(dir).await.is_err() || dir == top {
            break;
        }
        cursor = dir.parent();
    }
}
