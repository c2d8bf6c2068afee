//! Recorder widget
//!
//! The widget owns one recording session at a time and drives it:
//! - Camera acquisition and live preview binding
//! - Encoder lifecycle and segment collection
//! - Auto-stop timer
//! - Export to a playback preview and a download

mod config;
mod handle;
mod session;
mod state;
mod widget;

pub use config::{WidgetConfig, DEFAULT_FILE_NAME, DEFAULT_FLUSH_TIMEOUT_MS, DEFAULT_MAX_DURATION_MS};
pub use handle::WidgetHandle;
pub use state::{Control, ExportReport, RecordingState, StopReason, WidgetEvent, WidgetSnapshot};
pub use widget::{Host, RecorderWidget};
