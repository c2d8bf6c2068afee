use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::capture::SyntheticCameraConfig;
use crate::encoder::{SyntheticEncoderConfig, WEBM_MIME_TYPE};
use crate::widget::{
    WidgetConfig, DEFAULT_FILE_NAME, DEFAULT_FLUSH_TIMEOUT_MS, DEFAULT_MAX_DURATION_MS,
};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub recorder: RecorderConfig,
    pub downloads: DownloadsConfig,
    pub camera: CameraConfig,
}

#[derive(Debug, Deserialize)]
pub struct RecorderConfig {
    pub max_duration_ms: u64,
    pub flush_timeout_ms: u64,
    pub file_name: String,
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadsConfig {
    /// Directory downloads are saved to; `~` is expanded
    pub dir: String,
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub deny: bool,
    pub segment_interval_ms: u64,
    pub segment_bytes: usize,
}

impl Config {
    /// Load built-in defaults, then `path` (any supported extension, optional),
    /// then `CLIP_RECORDER__SECTION__KEY` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("recorder.max_duration_ms", DEFAULT_MAX_DURATION_MS as i64)?
            .set_default("recorder.flush_timeout_ms", DEFAULT_FLUSH_TIMEOUT_MS as i64)?
            .set_default("recorder.file_name", DEFAULT_FILE_NAME)?
            .set_default("recorder.mime_type", WEBM_MIME_TYPE)?
            .set_default("downloads.dir", "~/Downloads")?
            .set_default("camera.label", "Synthetic Camera")?
            .set_default("camera.width", 640)?
            .set_default("camera.height", 480)?
            .set_default("camera.frame_rate", 30)?
            .set_default("camera.deny", false)?
            .set_default("camera.segment_interval_ms", 1000)?
            .set_default("camera.segment_bytes", 4096)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CLIP_RECORDER").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn widget(&self) -> WidgetConfig {
        WidgetConfig {
            max_duration: Duration::from_millis(self.recorder.max_duration_ms),
            flush_timeout: Duration::from_millis(self.recorder.flush_timeout_ms),
            file_name: self.recorder.file_name.clone(),
            mime_type: self.recorder.mime_type.clone(),
        }
    }

    pub fn downloads_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.downloads.dir).into_owned())
    }

    pub fn camera(&self) -> SyntheticCameraConfig {
        SyntheticCameraConfig {
            label: self.camera.label.clone(),
            width: self.camera.width,
            height: self.camera.height,
            frame_rate: self.camera.frame_rate,
            deny: self.camera.deny,
        }
    }

    pub fn encoder(&self) -> SyntheticEncoderConfig {
        SyntheticEncoderConfig {
            timeslice: Duration::from_millis(self.camera.segment_interval_ms),
            segment_bytes: self.camera.segment_bytes,
        }
    }
}
