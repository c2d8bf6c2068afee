use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::capture::CaptureError;
use crate::export::{DownloadReceipt, Locator};

/// Whether the widget is recording
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
}

/// What ended a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// User pressed stop
    Manual,
    /// Auto-stop timer fired
    Timeout,
    /// Encoder finished on its own (e.g. the camera went away)
    EncoderEnded,
}

/// The single toggle button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    Stop,
}

impl Control {
    pub fn label(&self) -> &'static str {
        match self {
            Control::Start => "Start Recording",
            Control::Stop => "Stop Recording",
        }
    }
}

/// Observable widget state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetSnapshot {
    pub state: RecordingState,
    /// Whether an auto-stop timer is currently armed
    pub timer_armed: bool,
    /// Stream bound to the live preview surface
    pub live_preview: Option<Uuid>,
    /// Locator of the most recent finished recording
    pub playback: Option<Locator>,
}

impl WidgetSnapshot {
    /// Button to show for the current state
    pub fn control(&self) -> Control {
        match self.state {
            RecordingState::Idle => Control::Start,
            RecordingState::Recording => Control::Stop,
        }
    }
}

/// Summary of one exported session
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub session_id: Uuid,
    pub stop_reason: StopReason,
    pub started_at: DateTime<Utc>,
    /// Time between start and the stop request
    pub duration_ms: u64,
    pub segment_count: usize,
    pub bytes: usize,
    pub mime_type: String,
    pub file_name: String,
    pub preview: Locator,
    pub download: Option<DownloadReceipt>,
}

/// Notifications published by the widget
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    StateChanged(RecordingState),
    LivePreviewBound { stream_id: Uuid },
    /// Camera request refused; state stays idle
    CaptureFailed(CaptureError),
    /// Encoder could not be created or started; state stays idle
    EncoderFailed(String),
    /// Start pressed while a session was still active
    StartRejected,
    Exported(ExportReport),
    TornDown,
}
