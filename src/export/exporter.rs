use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::{error, info};

use super::artifact::Artifact;
use super::download::{DownloadLink, DownloadReceipt, DownloadSink};
use super::locator::{Locator, LocatorRegistry};
use crate::encoder::Segment;

/// Result of exporting one finished session
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub artifact: Arc<Artifact>,
    /// Locator for inline playback; stays live until replaced
    pub preview: Locator,
    /// `None` if the download could not be completed
    pub download: Option<DownloadReceipt>,
}

/// Turns a session's segments into an artifact, a preview and a download
pub struct Exporter {
    locators: LocatorRegistry,
    downloads: Arc<dyn DownloadSink>,
    file_name: String,
    mime_type: String,
}

impl Exporter {
    pub fn new(
        locators: LocatorRegistry,
        downloads: Arc<dyn DownloadSink>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            locators,
            downloads,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }

    pub async fn export(&self, segments: &[Segment]) -> ExportOutcome {
        let artifact = Arc::new(Artifact::merge(segments, self.mime_type.as_str()));
        info!(
            "Artifact built: {} segments, {} bytes ({})",
            artifact.segment_count(),
            artifact.len(),
            artifact.mime_type()
        );

        let preview = self.locators.register(Arc::clone(&artifact)).await;

        let download = match self.download(&artifact).await {
            Ok(receipt) => Some(receipt),
            Err(e) => {
                error!("Failed to download {}: {:#}", self.file_name, e);
                None
            }
        };

        ExportOutcome {
            artifact,
            preview,
            download,
        }
    }

    /// Register a download-only locator, activate a transient link with it,
    /// then revoke it whatever the outcome
    async fn download(&self, artifact: &Arc<Artifact>) -> Result<DownloadReceipt> {
        let link = DownloadLink {
            href: self.locators.register(Arc::clone(artifact)).await,
            file_name: self.file_name.clone(),
        };

        let result = match self.locators.resolve(&link.href).await {
            Some(resolved) => self.downloads.activate(&link, &resolved).await,
            None => Err(anyhow!("Download locator {} is not live", link.href)),
        };

        self.locators.revoke(&link.href).await;
        result
    }
}
