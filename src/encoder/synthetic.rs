use anyhow::{bail, Result};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

use super::backend::{Encoder, EncoderEvent, EncoderFactory, Segment};
use crate::capture::{CaptureHandle, MediaTrack};

/// Container type the synthetic encoder pretends to produce
pub const WEBM_MIME_TYPE: &str = "video/webm";

const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];
const CLUSTER_ID: [u8; 4] = [0x1F, 0x43, 0xB6, 0x75];

/// Configuration for the synthetic encoder
#[derive(Debug, Clone)]
pub struct SyntheticEncoderConfig {
    /// How often a segment is emitted
    pub timeslice: Duration,
    /// Size of a full segment in bytes
    pub segment_bytes: usize,
}

impl Default for SyntheticEncoderConfig {
    fn default() -> Self {
        Self {
            timeslice: Duration::from_millis(1000),
            segment_bytes: 4096,
        }
    }
}

/// Builds `SyntheticEncoder`s for video capture handles
pub struct SyntheticEncoderFactory {
    config: SyntheticEncoderConfig,
}

impl SyntheticEncoderFactory {
    pub fn new(config: SyntheticEncoderConfig) -> Self {
        Self { config }
    }
}

impl EncoderFactory for SyntheticEncoderFactory {
    fn create(&self, capture: &CaptureHandle, mime_type: &str) -> Result<Box<dyn Encoder>> {
        if mime_type != WEBM_MIME_TYPE {
            bail!("Unsupported container type: {}", mime_type);
        }

        let tracks: Vec<MediaTrack> = capture.video_tracks().cloned().collect();
        if tracks.is_empty() {
            bail!("Capture stream {} has no video track", capture.stream_id());
        }

        Ok(Box::new(SyntheticEncoder::new(self.config.clone(), tracks)))
    }
}

/// Emits placeholder WebM-looking segments on a fixed timeslice
///
/// The first segment starts with an EBML header, later ones with a cluster
/// ID. On stop the partial timeslice is flushed as a final (possibly empty)
/// segment. The encoder also ends by itself once every track has stopped.
pub struct SyntheticEncoder {
    config: SyntheticEncoderConfig,
    tracks: Vec<MediaTrack>,
    stop_tx: Option<oneshot::Sender<()>>,
    started: bool,
}

impl SyntheticEncoder {
    pub fn new(config: SyntheticEncoderConfig, tracks: Vec<MediaTrack>) -> Self {
        Self {
            config,
            tracks,
            stop_tx: None,
            started: false,
        }
    }
}

impl Encoder for SyntheticEncoder {
    fn start(&mut self) -> Result<mpsc::Receiver<EncoderEvent>> {
        if self.started {
            bail!("Encoder already started");
        }
        self.started = true;

        let (event_tx, event_rx) = mpsc::channel(100);
        let (stop_tx, stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);

        info!(
            "Synthetic encoder started ({}ms timeslice, {} bytes/segment)",
            self.config.timeslice.as_millis(),
            self.config.segment_bytes
        );

        tokio::spawn(run_encoder(
            self.config.clone(),
            self.tracks.clone(),
            event_tx,
            stop_rx,
        ));

        Ok(event_rx)
    }

    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // Task may already have ended on its own
            let _ = stop_tx.send(());
        }
    }

    fn is_recording(&self) -> bool {
        self.stop_tx.is_some()
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

async fn run_encoder(
    config: SyntheticEncoderConfig,
    tracks: Vec<MediaTrack>,
    events: mpsc::Sender<EncoderEvent>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let started = Instant::now();
    let mut ticker = interval_at(started + config.timeslice, config.timeslice);
    let mut index = 0usize;
    let mut last_emit = started;

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                if !tracks.iter().any(|t| t.is_live()) {
                    info!("All capture tracks ended, stopping synthetic encoder");
                    break;
                }

                let now = Instant::now();
                let segment = build_segment(index, config.segment_bytes, elapsed_ms(started, now));
                debug!("Segment {} ready ({} bytes)", index, segment.len());
                if events.send(EncoderEvent::Data(segment)).await.is_err() {
                    return;
                }
                index += 1;
                last_emit = now;
            }
        }
    }

    // Flush whatever part of the current timeslice was recorded
    let now = Instant::now();
    let pending = now.duration_since(last_emit).as_millis() as usize;
    let slice = config.timeslice.as_millis().max(1) as usize;
    let flush_bytes = config.segment_bytes * pending.min(slice) / slice;
    let segment = build_segment(index, flush_bytes, elapsed_ms(started, now));
    if events.send(EncoderEvent::Data(segment)).await.is_err() {
        return;
    }

    let _ = events.send(EncoderEvent::Stopped).await;
    info!("Synthetic encoder stopped after {} full segments", index);
}

fn elapsed_ms(started: Instant, now: Instant) -> u64 {
    now.duration_since(started).as_millis() as u64
}

fn build_segment(index: usize, len: usize, timecode_ms: u64) -> Segment {
    let marker = if index == 0 { EBML_MAGIC } else { CLUSTER_ID };
    let mut data: Vec<u8> = marker.iter().copied().take(len).collect();
    data.resize(len, (index % 251) as u8);
    Segment::new(data, timecode_ms)
}
