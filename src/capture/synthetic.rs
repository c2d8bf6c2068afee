use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use super::backend::{CaptureBackend, CaptureConstraints, CaptureError};
use super::handle::{CaptureHandle, MediaTrack, TrackKind, TrackSettings};

/// Configuration for the synthetic camera
#[derive(Debug, Clone)]
pub struct SyntheticCameraConfig {
    /// Device label reported on the video track
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    /// Refuse every capture request, as if the user denied permission
    pub deny: bool,
}

impl Default for SyntheticCameraConfig {
    fn default() -> Self {
        Self {
            label: "Synthetic Camera".to_string(),
            width: 640,
            height: 480,
            frame_rate: 30,
            deny: false,
        }
    }
}

/// Fake camera that hands out video-only capture handles
///
/// Keeps a clone of every track it issued so callers can check that the
/// widget stopped them.
pub struct SyntheticCamera {
    config: SyntheticCameraConfig,
    issued: Arc<Mutex<Vec<MediaTrack>>>,
}

impl SyntheticCamera {
    pub fn new(config: SyntheticCameraConfig) -> Self {
        Self {
            config,
            issued: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every track handed out so far, in issue order
    pub fn issued_tracks(&self) -> Vec<MediaTrack> {
        match self.issued.lock() {
            Ok(issued) => issued.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of issued tracks that are still live
    pub fn live_tracks(&self) -> usize {
        self.issued_tracks().iter().filter(|t| t.is_live()).count()
    }
}

#[async_trait::async_trait]
impl CaptureBackend for SyntheticCamera {
    async fn acquire(&self, constraints: CaptureConstraints) -> Result<CaptureHandle, CaptureError> {
        if self.config.deny {
            warn!("{}: capture request denied", self.config.label);
            return Err(CaptureError::PermissionDenied(format!(
                "{} is blocked for this origin",
                self.config.label
            )));
        }

        if !constraints.video {
            return Err(CaptureError::NoDevice);
        }

        let track = MediaTrack::new(
            TrackKind::Video,
            self.config.label.clone(),
            TrackSettings {
                width: self.config.width,
                height: self.config.height,
                frame_rate: self.config.frame_rate,
            },
        );

        match self.issued.lock() {
            Ok(mut issued) => issued.push(track.clone()),
            Err(poisoned) => poisoned.into_inner().push(track.clone()),
        }

        let handle = CaptureHandle::new(vec![track]);
        info!(
            "{}: granted stream {} ({}x{} @ {}fps)",
            self.config.label,
            handle.stream_id(),
            self.config.width,
            self.config.height,
            self.config.frame_rate
        );

        Ok(handle)
    }

    fn name(&self) -> &str {
        &self.config.label
    }
}
