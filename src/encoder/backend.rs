use anyhow::Result;
use tokio::sync::mpsc;

use crate::capture::CaptureHandle;

/// One chunk of encoder output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Encoded bytes, opaque to the widget
    pub data: Vec<u8>,
    /// Milliseconds since the encoder started
    pub timecode_ms: u64,
}

impl Segment {
    pub fn new(data: Vec<u8>, timecode_ms: u64) -> Self {
        Self { data, timecode_ms }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Events emitted by a running encoder, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderEvent {
    /// A data segment is available
    Data(Segment),
    /// The encoder has flushed its last segment and stopped
    Stopped,
}

/// Host encoding facility bound to one capture handle
pub trait Encoder: Send {
    /// Start encoding
    ///
    /// Returns a channel receiver that will receive segments followed by a
    /// single `Stopped` event.
    fn start(&mut self) -> Result<mpsc::Receiver<EncoderEvent>>;

    /// Request a stop. Stopping an encoder that is not running is a no-op.
    fn stop(&mut self);

    /// Check if the encoder is currently running
    fn is_recording(&self) -> bool;

    /// Get encoder name for logging
    fn name(&self) -> &str;
}

/// Creates encoders for freshly acquired capture handles
pub trait EncoderFactory: Send + Sync {
    fn create(&self, capture: &CaptureHandle, mime_type: &str) -> Result<Box<dyn Encoder>>;
}
