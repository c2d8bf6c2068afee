use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use super::state::StopReason;
use crate::capture::CaptureHandle;
use crate::encoder::{Encoder, EncoderEvent, Segment};

/// One recording session: capture, encoder, timer and collected segments
///
/// Created once the camera and encoder are running, destroyed when the
/// encoder reports completion or the widget is torn down.
pub(crate) struct Session {
    id: Uuid,
    capture: CaptureHandle,
    encoder: Box<dyn Encoder>,
    events: mpsc::Receiver<EncoderEvent>,
    deadline: Option<Instant>,
    flush_deadline: Option<Instant>,
    segments: Vec<Segment>,
    dropped_empty: usize,
    started_at: DateTime<Utc>,
    started: Instant,
    stop_requested: Option<(StopReason, Instant)>,
}

/// What is left of a session once the encoder has completed
pub(crate) struct FinishedSession {
    pub id: Uuid,
    pub segments: Vec<Segment>,
    pub stop_reason: StopReason,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl Session {
    pub fn begin(
        capture: CaptureHandle,
        encoder: Box<dyn Encoder>,
        events: mpsc::Receiver<EncoderEvent>,
        max_duration: Duration,
    ) -> Self {
        let started = Instant::now();
        Self {
            id: Uuid::new_v4(),
            capture,
            encoder,
            events,
            deadline: Some(started + max_duration),
            flush_deadline: None,
            segments: Vec::new(),
            dropped_empty: 0,
            started_at: Utc::now(),
            started,
            stop_requested: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Auto-stop deadline, cleared once a stop has been requested
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Latest time to wait for the encoder's completion after a stop
    pub fn flush_deadline(&self) -> Option<Instant> {
        self.flush_deadline
    }

    pub fn is_stopping(&self) -> bool {
        self.stop_requested.is_some()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Wait for the next encoder event
    ///
    /// A closed channel counts as completion.
    pub async fn next_event(&mut self) -> EncoderEvent {
        self.events.recv().await.unwrap_or(EncoderEvent::Stopped)
    }

    /// Keep a segment. Empty segments are dropped; returns whether it was kept.
    pub fn append(&mut self, segment: Segment) -> bool {
        if segment.is_empty() {
            self.dropped_empty += 1;
            debug!("Session {}: dropped empty segment at {}ms", self.id, segment.timecode_ms);
            return false;
        }

        debug!(
            "Session {}: segment {} ({} bytes at {}ms)",
            self.id,
            self.segments.len(),
            segment.len(),
            segment.timecode_ms
        );
        self.segments.push(segment);
        true
    }

    /// Ask the encoder to stop, disarm the timer and release the camera
    ///
    /// The encoder then has until `flush_timeout` to report completion.
    /// Returns false if a stop was already requested.
    pub fn request_stop(&mut self, reason: StopReason, flush_timeout: Duration) -> bool {
        if self.stop_requested.is_some() {
            return false;
        }

        let now = Instant::now();
        self.deadline = None;
        self.flush_deadline = Some(now + flush_timeout);
        self.stop_requested = Some((reason, now));
        self.encoder.stop();
        self.capture.release();
        true
    }

    /// Release the capture and hand over the segments
    pub fn finish(mut self) -> FinishedSession {
        self.deadline = None;
        self.flush_deadline = None;
        if self.encoder.is_recording() {
            self.encoder.stop();
        }
        self.capture.release();

        let (stop_reason, stopped) = self
            .stop_requested
            .unwrap_or((StopReason::EncoderEnded, Instant::now()));

        info!(
            "Session {} finished ({:?}): {} segments kept, {} empty dropped",
            self.id,
            stop_reason,
            self.segments.len(),
            self.dropped_empty
        );

        FinishedSession {
            id: self.id,
            segments: std::mem::take(&mut self.segments),
            stop_reason,
            started_at: self.started_at,
            duration: stopped.duration_since(self.started),
        }
    }

    /// Tear down without exporting, whether or not the encoder ever completes
    pub fn abort(mut self) {
        self.deadline = None;
        self.flush_deadline = None;
        if self.encoder.is_recording() {
            self.encoder.stop();
        }
        self.capture.release();
        info!(
            "Session {} aborted with {} segments discarded",
            self.id,
            self.segments.len()
        );
    }
}
