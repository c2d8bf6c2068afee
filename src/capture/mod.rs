pub mod backend;
pub mod handle;
pub mod synthetic;

pub use backend::{CaptureBackend, CaptureConstraints, CaptureError};
pub use handle::{CaptureHandle, MediaTrack, TrackKind, TrackSettings};
pub use synthetic::{SyntheticCamera, SyntheticCameraConfig};
