use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::artifact::Artifact;
use super::locator::Locator;

/// Transient link used to trigger a single download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub href: Locator,
    pub file_name: String,
}

/// What a download sink did with an activated link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadReceipt {
    pub file_name: String,
    /// Where the bytes landed, if the sink writes to disk
    pub path: Option<PathBuf>,
    pub bytes: usize,
}

/// Host download facility
#[async_trait::async_trait]
pub trait DownloadSink: Send + Sync {
    /// Activate a download link whose locator resolved to `artifact`
    async fn activate(&self, link: &DownloadLink, artifact: &Artifact) -> Result<DownloadReceipt>;
}

/// Saves downloads into a directory, like a browser's downloads folder
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait::async_trait]
impl DownloadSink for DirectoryDownloads {
    async fn activate(&self, link: &DownloadLink, artifact: &Artifact) -> Result<DownloadReceipt> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create downloads directory: {:?}", self.dir))?;

        let path = self.dir.join(&link.file_name);
        tokio::fs::write(&path, artifact.data())
            .await
            .with_context(|| format!("Failed to write download: {:?}", path))?;

        info!(
            "Downloaded {} ({} bytes, {}) to {}",
            link.href,
            artifact.len(),
            artifact.mime_type(),
            path.display()
        );

        Ok(DownloadReceipt {
            file_name: link.file_name.clone(),
            path: Some(path),
            bytes: artifact.len(),
        })
    }
}
