use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Kind of a media track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Video,
    Audio,
}

/// Negotiated track settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSettings {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

/// One constituent track of a capture handle
///
/// Clones share the same live flag, so the host can observe when the widget
/// stops a track it handed out.
#[derive(Debug, Clone)]
pub struct MediaTrack {
    id: Uuid,
    kind: TrackKind,
    label: String,
    settings: TrackSettings,
    live: Arc<AtomicBool>,
}

impl MediaTrack {
    pub fn new(kind: TrackKind, label: impl Into<String>, settings: TrackSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            label: label.into(),
            settings,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn settings(&self) -> TrackSettings {
        self.settings
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Stop the track. Returns true if it was live.
    pub fn stop(&self) -> bool {
        self.live.swap(false, Ordering::SeqCst)
    }
}

/// Live input handle obtained from the host
///
/// Owned by exactly one recording session and released once.
#[derive(Debug)]
pub struct CaptureHandle {
    stream_id: Uuid,
    tracks: Vec<MediaTrack>,
    released: bool,
}

impl CaptureHandle {
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self {
            stream_id: Uuid::new_v4(),
            tracks,
            released: false,
        }
    }

    /// Identifier used to bind the live preview
    pub fn stream_id(&self) -> Uuid {
        self.stream_id
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &MediaTrack> {
        self.tracks.iter().filter(|t| t.kind() == TrackKind::Video)
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Stop every track. Later calls are no-ops.
    ///
    /// Returns the number of tracks that were still live.
    pub fn release(&mut self) -> usize {
        if self.released {
            return 0;
        }
        self.released = true;

        let stopped = self.tracks.iter().filter(|t| t.stop()).count();
        info!(
            "Released capture stream {} ({} of {} tracks stopped)",
            self.stream_id,
            stopped,
            self.tracks.len()
        );
        stopped
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        if !self.released {
            warn!("Capture stream {} dropped without release, stopping tracks", self.stream_id);
            self.release();
        }
    }
}
