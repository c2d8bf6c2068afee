use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::encoder::WEBM_MIME_TYPE;

/// Auto-stop limit applied when nothing else is configured
pub const DEFAULT_MAX_DURATION_MS: u64 = 10_000;

/// How long a stopped encoder may take to deliver its last segment
pub const DEFAULT_FLUSH_TIMEOUT_MS: u64 = 2_000;

/// File name offered for every download
pub const DEFAULT_FILE_NAME: &str = "recorded-video.webm";

/// Configuration for the recorder widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Recording stops automatically after this long
    /// Default: 10 seconds
    pub max_duration: Duration,

    /// After a stop, export whatever was collected if the encoder has not
    /// completed by then
    pub flush_timeout: Duration,

    /// Name given to the downloaded artifact
    pub file_name: String,

    /// Container type the encoder is asked for and the artifact is tagged with
    pub mime_type: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            max_duration: Duration::from_millis(DEFAULT_MAX_DURATION_MS),
            flush_timeout: Duration::from_millis(DEFAULT_FLUSH_TIMEOUT_MS),
            file_name: DEFAULT_FILE_NAME.to_string(),
            mime_type: WEBM_MIME_TYPE.to_string(),
        }
    }
}
