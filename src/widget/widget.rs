use futures::future::OptionFuture;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep_until;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::WidgetConfig;
use super::handle::{Command, WidgetHandle};
use super::session::Session;
use super::state::{ExportReport, RecordingState, StopReason, WidgetEvent, WidgetSnapshot};
use crate::capture::{CaptureBackend, CaptureConstraints};
use crate::encoder::{EncoderEvent, EncoderFactory};
use crate::export::{DownloadSink, Exporter, Locator, LocatorRegistry};

/// Host facilities the widget runs against
pub struct Host {
    pub camera: Arc<dyn CaptureBackend>,
    pub encoders: Arc<dyn EncoderFactory>,
    pub locators: LocatorRegistry,
    pub downloads: Arc<dyn DownloadSink>,
}

enum Wake {
    Encoder(EncoderEvent),
    Command(Option<Command>),
    Deadline,
}

/// Record/idle toggle that captures, auto-stops and exports one clip at a time
///
/// Runs as a single task; every state change happens on that task.
pub struct RecorderWidget {
    config: WidgetConfig,
    camera: Arc<dyn CaptureBackend>,
    encoders: Arc<dyn EncoderFactory>,
    locators: LocatorRegistry,
    exporter: Exporter,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<WidgetEvent>,
    snapshot: watch::Sender<WidgetSnapshot>,
    session: Option<Session>,
    state: RecordingState,
    live_preview: Option<Uuid>,
    playback: Option<Locator>,
}

impl RecorderWidget {
    /// Spawn the widget task
    pub fn spawn(config: WidgetConfig, host: Host) -> (WidgetHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, _) = broadcast::channel(64);
        let (snapshot_tx, snapshot_rx) = watch::channel(WidgetSnapshot::default());

        let exporter = Exporter::new(
            host.locators.clone(),
            host.downloads,
            config.file_name.clone(),
            config.mime_type.clone(),
        );

        let widget = Self {
            config,
            camera: host.camera,
            encoders: host.encoders,
            locators: host.locators,
            exporter,
            commands: command_rx,
            events: event_tx.clone(),
            snapshot: snapshot_tx,
            session: None,
            state: RecordingState::Idle,
            live_preview: None,
            playback: None,
        };

        let handle = WidgetHandle::new(command_tx, event_tx, snapshot_rx);
        let task = tokio::spawn(widget.run());

        (handle, task)
    }

    async fn run(mut self) {
        info!(
            "Recorder widget ready ({}ms limit, {} as {})",
            self.config.max_duration.as_millis(),
            self.config.file_name,
            self.config.mime_type
        );

        loop {
            // Auto-stop while recording, flush limit once stopping
            let deadline = self
                .session
                .as_ref()
                .and_then(|s| s.deadline().or(s.flush_deadline()));

            // Encoder output first so nothing emitted before a stop is lost
            let wake = tokio::select! {
                biased;
                Some(event) = next_encoder_event(&mut self.session) => Wake::Encoder(event),
                command = self.commands.recv() => Wake::Command(command),
                Some(()) = OptionFuture::from(deadline.map(sleep_until)) => Wake::Deadline,
            };

            match wake {
                Wake::Encoder(EncoderEvent::Data(segment)) => {
                    if let Some(session) = self.session.as_mut() {
                        session.append(segment);
                    }
                }
                Wake::Encoder(EncoderEvent::Stopped) => self.finish_session().await,
                Wake::Command(Some(Command::Start)) => self.start().await,
                Wake::Command(Some(Command::Stop)) => self.stop(StopReason::Manual),
                Wake::Command(Some(Command::Teardown)) | Wake::Command(None) => {
                    self.teardown().await;
                    break;
                }
                Wake::Deadline if self.session.as_ref().map_or(false, Session::is_stopping) => {
                    warn!(
                        "Encoder did not finish within {}ms of stop, exporting collected segments",
                        self.config.flush_timeout.as_millis()
                    );
                    self.finish_session().await;
                }
                Wake::Deadline => {
                    info!(
                        "Auto-stop after {}ms",
                        self.config.max_duration.as_millis()
                    );
                    self.stop(StopReason::Timeout);
                }
            }
        }

        info!("Recorder widget stopped");
    }

    async fn start(&mut self) {
        if let Some(session) = &self.session {
            if session.is_stopping() {
                warn!(
                    "Start ignored: session {} is still flushing its encoder",
                    session.id()
                );
            } else {
                warn!("Start ignored: session {} is recording", session.id());
            }
            self.emit(WidgetEvent::StartRejected);
            return;
        }

        info!("Requesting video capture from {}", self.camera.name());
        let mut capture = match self.camera.acquire(CaptureConstraints::video_only()).await {
            Ok(capture) => capture,
            Err(e) => {
                warn!("Failed to start recording: {}", e);
                self.emit(WidgetEvent::CaptureFailed(e));
                return;
            }
        };

        let stream_id = capture.stream_id();

        let mut encoder = match self.encoders.create(&capture, &self.config.mime_type) {
            Ok(encoder) => encoder,
            Err(e) => {
                error!("Failed to create encoder: {:#}", e);
                capture.release();
                self.emit(WidgetEvent::EncoderFailed(format!("{:#}", e)));
                return;
            }
        };

        let events = match encoder.start() {
            Ok(events) => events,
            Err(e) => {
                error!("Failed to start {} encoder: {:#}", encoder.name(), e);
                capture.release();
                self.emit(WidgetEvent::EncoderFailed(format!("{:#}", e)));
                return;
            }
        };

        let encoder_name = encoder.name().to_string();
        let session = Session::begin(capture, encoder, events, self.config.max_duration);
        info!(
            "Recording session {} started ({} encoder, stream {})",
            session.id(),
            encoder_name,
            stream_id
        );

        self.session = Some(session);
        self.live_preview = Some(stream_id);
        self.emit(WidgetEvent::LivePreviewBound { stream_id });
        self.set_state(RecordingState::Recording);
    }

    fn stop(&mut self, reason: StopReason) {
        let Some(session) = self.session.as_mut() else {
            debug!("Stop ignored: not recording");
            return;
        };

        if !session.request_stop(reason, self.config.flush_timeout) {
            debug!("Stop ignored: session {} already stopping", session.id());
            return;
        }

        info!(
            "Stopping session {} ({:?}, {} segments so far)",
            session.id(),
            reason,
            session.segment_count()
        );
        self.live_preview = None;
        self.set_state(RecordingState::Idle);
    }

    async fn finish_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        let finished = session.finish();
        self.live_preview = None;
        self.set_state(RecordingState::Idle);

        let outcome = self.exporter.export(&finished.segments).await;

        if let Some(previous) = self.playback.replace(outcome.preview.clone()) {
            self.locators.revoke(&previous).await;
        }
        self.publish_snapshot();

        let report = ExportReport {
            session_id: finished.id,
            stop_reason: finished.stop_reason,
            started_at: finished.started_at,
            duration_ms: finished.duration.as_millis() as u64,
            segment_count: outcome.artifact.segment_count(),
            bytes: outcome.artifact.len(),
            mime_type: outcome.artifact.mime_type().to_string(),
            file_name: self.config.file_name.clone(),
            preview: outcome.preview,
            download: outcome.download,
        };

        info!(
            "Session {} exported: {} segments, {} bytes, preview {}",
            report.session_id, report.segment_count, report.bytes, report.preview
        );
        self.emit(WidgetEvent::Exported(report));
    }

    async fn teardown(&mut self) {
        info!("Tearing down recorder widget");

        if let Some(session) = self.session.take() {
            session.abort();
        }
        if let Some(preview) = self.playback.take() {
            self.locators.revoke(&preview).await;
        }
        self.live_preview = None;

        self.set_state(RecordingState::Idle);
        self.publish_snapshot();
        self.emit(WidgetEvent::TornDown);
    }

    fn set_state(&mut self, state: RecordingState) {
        let changed = self.state != state;
        self.state = state;
        self.publish_snapshot();

        if changed {
            self.emit(WidgetEvent::StateChanged(state));
        }
    }

    fn publish_snapshot(&self) {
        let snapshot = WidgetSnapshot {
            state: self.state,
            timer_armed: self
                .session
                .as_ref()
                .map_or(false, |s| s.deadline().is_some()),
            live_preview: self.live_preview,
            playback: self.playback.clone(),
        };
        self.snapshot.send_replace(snapshot);
    }

    fn emit(&self, event: WidgetEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

async fn next_encoder_event(session: &mut Option<Session>) -> Option<EncoderEvent> {
    match session {
        Some(session) => Some(session.next_event().await),
        None => futures::future::pending().await,
    }
}
