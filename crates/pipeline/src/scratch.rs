//! Per-request scratch files.
//!
//! Every analysis request gets a path of its own under the scratch root, so
//! concurrent requests never collide even when they fetch the same URL.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Allocates collision-free scratch paths.
#[derive(Debug)]
pub struct ScratchDir {
    root: PathBuf,
    seq: AtomicU64,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            seq: AtomicU64::new(1),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserve a fresh path with the given extension.
    ///
    /// Returns the request sequence number alongside the path. Nothing is
    /// created on disk.
    pub fn allocate(&self, extension: &str) -> (u64, PathBuf) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let name = format!("video-{seq}-{}.{extension}", uuid::Uuid::now_v7());
        (seq, self.root.join(name))
    }
}

/// A downloaded video living in the scratch directory.
///
/// Owned by exactly one request. Call [`VideoAsset::release`] when done; if
/// the asset is dropped without being released the file is removed
/// synchronously.
#[derive(Debug)]
pub struct VideoAsset {
    source_url: String,
    local_path: PathBuf,
    size_bytes: u64,
    released: bool,
}

impl VideoAsset {
    pub fn new(source_url: impl Into<String>, local_path: PathBuf, size_bytes: u64) -> Self {
        Self {
            source_url: source_url.into(),
            local_path,
            size_bytes,
            released: false,
        }
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Delete the scratch file. Failures are logged and swallowed.
    pub async fn release(mut self) {
        self.released = true;
        match tokio::fs::remove_file(&self.local_path).await {
            Ok(()) => {
                tracing::debug!(
                    url = %self.source_url,
                    path = %self.local_path.display(),
                    "Scratch file removed"
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.local_path.display(), "Scratch file already gone");
            }
            Err(e) => {
                tracing::warn!(
                    url = %self.source_url,
                    path = %self.local_path.display(),
                    error = %e,
                    "Failed to remove scratch file"
                );
            }
        }
    }
}

impl Drop for VideoAsset {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.local_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.local_path.display(),
                    error = %e,
                    "Failed to remove scratch file on drop"
                );
            }
        }
    }
}
