pub mod capture;
pub mod config;
pub mod encoder;
pub mod export;
pub mod widget;

pub use capture::{
    CaptureBackend, CaptureConstraints, CaptureError, CaptureHandle, MediaTrack, SyntheticCamera,
    SyntheticCameraConfig,
};
pub use config::Config;
pub use encoder::{
    Encoder, EncoderEvent, EncoderFactory, Segment, SyntheticEncoderConfig, SyntheticEncoderFactory,
};
pub use export::{Artifact, DirectoryDownloads, DownloadLink, DownloadReceipt, DownloadSink, Locator, LocatorRegistry};
pub use widget::{
    Control, ExportReport, Host, RecorderWidget, RecordingState, StopReason, WidgetConfig, WidgetEvent,
    WidgetHandle, WidgetSnapshot,
};
