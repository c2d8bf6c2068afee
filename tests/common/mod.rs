// Shared fixtures for widget integration tests
//
// ScriptedEncoderFactory emits segments at fixed times after start, so
// tests can run on tokio's paused clock and assert exact timings.

#![allow(dead_code)]

use anyhow::Result;
use clip_recorder::{
    Artifact, CaptureHandle, DownloadLink, DownloadReceipt, DownloadSink, Encoder, EncoderEvent,
    EncoderFactory, ExportReport, Host, LocatorRegistry, Segment, SyntheticCamera, SyntheticCameraConfig,
    WidgetEvent,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

/// Counters shared by every encoder a factory creates
#[derive(Default)]
pub struct EncoderStats {
    pub created: AtomicUsize,
    /// Stop requests that reached a running encoder
    pub stops: AtomicUsize,
}

impl EncoderStats {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

pub struct ScriptedEncoderFactory {
    /// (milliseconds after start, segment length)
    schedule: Vec<(u64, usize)>,
    /// When false the encoder never reports completion
    completes: bool,
    pub stats: Arc<EncoderStats>,
}

impl ScriptedEncoderFactory {
    pub fn new(schedule: Vec<(u64, usize)>) -> Self {
        Self {
            schedule,
            completes: true,
            stats: Arc::new(EncoderStats::default()),
        }
    }

    pub fn never_completing(schedule: Vec<(u64, usize)>) -> Self {
        Self {
            completes: false,
            ..Self::new(schedule)
        }
    }
}

impl EncoderFactory for ScriptedEncoderFactory {
    fn create(&self, _capture: &CaptureHandle, _mime_type: &str) -> Result<Box<dyn Encoder>> {
        self.stats.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedEncoder {
            schedule: self.schedule.clone(),
            completes: self.completes,
            stats: Arc::clone(&self.stats),
            stop_tx: None,
        }))
    }
}

struct ScriptedEncoder {
    schedule: Vec<(u64, usize)>,
    completes: bool,
    stats: Arc<EncoderStats>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl Encoder for ScriptedEncoder {
    fn start(&mut self) -> Result<mpsc::Receiver<EncoderEvent>> {
        let (tx, rx) = mpsc::channel(32);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        self.stop_tx = Some(stop_tx);

        let schedule = self.schedule.clone();
        let completes = self.completes;

        tokio::spawn(async move {
            let started = Instant::now();
            let mut stopped = false;

            for (index, (at_ms, len)) in schedule.into_iter().enumerate() {
                tokio::select! {
                    _ = &mut stop_rx => {
                        stopped = true;
                        break;
                    }
                    _ = sleep_until(started + Duration::from_millis(at_ms)) => {
                        let segment = Segment::new(vec![index as u8 + 1; len], at_ms);
                        if tx.send(EncoderEvent::Data(segment)).await.is_err() {
                            return;
                        }
                    }
                }
            }

            if !stopped {
                let _ = stop_rx.await;
            }

            if completes {
                let _ = tx.send(EncoderEvent::Stopped).await;
            } else {
                std::future::pending::<()>().await;
            }
        });

        Ok(rx)
    }

    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            self.stats.stops.fetch_add(1, Ordering::SeqCst);
            let _ = stop_tx.send(());
        }
    }

    fn is_recording(&self) -> bool {
        self.stop_tx.is_some()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// One activated download link
#[derive(Debug, Clone)]
pub struct CapturedDownload {
    pub link: DownloadLink,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Download sink that remembers every activation instead of writing files
#[derive(Clone, Default)]
pub struct RecordingDownloads {
    captured: Arc<Mutex<Vec<CapturedDownload>>>,
}

impl RecordingDownloads {
    pub fn captured(&self) -> Vec<CapturedDownload> {
        self.captured.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DownloadSink for RecordingDownloads {
    async fn activate(&self, link: &DownloadLink, artifact: &Artifact) -> Result<DownloadReceipt> {
        self.captured.lock().unwrap().push(CapturedDownload {
            link: link.clone(),
            mime_type: artifact.mime_type().to_string(),
            data: artifact.data().to_vec(),
        });

        Ok(DownloadReceipt {
            file_name: link.file_name.clone(),
            path: None,
            bytes: artifact.len(),
        })
    }
}

pub struct Fixture {
    pub camera: Arc<SyntheticCamera>,
    pub locators: LocatorRegistry,
    pub downloads: RecordingDownloads,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_camera(SyntheticCameraConfig::default())
    }

    pub fn with_camera(config: SyntheticCameraConfig) -> Self {
        Self {
            camera: Arc::new(SyntheticCamera::new(config)),
            locators: LocatorRegistry::new(),
            downloads: RecordingDownloads::default(),
        }
    }

    pub fn host(&self, encoders: Arc<dyn EncoderFactory>) -> Host {
        Host {
            camera: self.camera.clone(),
            encoders,
            locators: self.locators.clone(),
            downloads: Arc::new(self.downloads.clone()),
        }
    }
}

/// Wait for the next event `pick` accepts, skipping the rest
pub async fn next_event<T>(
    events: &mut broadcast::Receiver<WidgetEvent>,
    mut pick: impl FnMut(WidgetEvent) -> Option<T>,
) -> T {
    loop {
        let event = events.recv().await.expect("widget event stream closed");
        if let Some(found) = pick(event) {
            return found;
        }
    }
}

pub async fn next_export(events: &mut broadcast::Receiver<WidgetEvent>) -> ExportReport {
    next_event(events, |event| match event {
        WidgetEvent::Exported(report) => Some(report),
        _ => None,
    })
    .await
}
