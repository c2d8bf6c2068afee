use thiserror::Error;

use super::handle::CaptureHandle;

/// What the widget asks the host for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub video: bool,
    pub audio: bool,
}

impl CaptureConstraints {
    /// Video only, no audio
    pub fn video_only() -> Self {
        Self {
            video: true,
            audio: false,
        }
    }
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self::video_only()
    }
}

/// Why the host refused to hand out a capture handle
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No video input device available")]
    NoDevice,

    #[error("Device busy: {0}")]
    DeviceBusy(String),
}

/// Host capture facility
///
/// Implementations:
/// - `SyntheticCamera`: fake camera for the CLI and tests
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Request a live input stream matching `constraints`
    ///
    /// Suspends until the host grants or denies the request.
    async fn acquire(&self, constraints: CaptureConstraints) -> Result<CaptureHandle, CaptureError>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
