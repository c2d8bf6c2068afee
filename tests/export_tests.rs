// Integration tests for segment collection and export
//
// Verifies what ends up in the artifact, how preview locators are replaced,
// and the full pipeline against the synthetic camera and encoder.

mod common;

use anyhow::Result;
use clip_recorder::{
    DirectoryDownloads, Host, LocatorRegistry, RecorderWidget, StopReason, SyntheticCamera,
    SyntheticCameraConfig, SyntheticEncoderConfig, SyntheticEncoderFactory, WidgetConfig,
};
use common::{next_export, Fixture, ScriptedEncoderFactory};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_empty_segments_are_not_merged() -> Result<()> {
    let fixture = Fixture::new();
    let encoders = Arc::new(ScriptedEncoderFactory::new(vec![
        (1000, 10),
        (2000, 0),
        (3000, 10),
        (3500, 0),
    ]));
    let config = WidgetConfig {
        max_duration: Duration::from_secs(4),
        ..Default::default()
    };
    let (widget, _task) = RecorderWidget::spawn(config, fixture.host(encoders));
    let mut events = widget.subscribe();

    widget.start().await?;
    let report = next_export(&mut events).await;

    assert_eq!(report.segment_count, 2);
    assert_eq!(report.bytes, 20);
    assert_eq!(report.duration_ms, 4000);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_new_session_starts_with_no_segments() -> Result<()> {
    let fixture = Fixture::new();
    let encoders = Arc::new(ScriptedEncoderFactory::new(vec![(100, 10), (200, 10)]));
    let (widget, _task) = RecorderWidget::spawn(WidgetConfig::default(), fixture.host(encoders));
    let mut events = widget.subscribe();

    // First session: both segments
    widget.start().await?;
    sleep(Duration::from_millis(500)).await;
    widget.stop().await?;
    let first = next_export(&mut events).await;

    // Second session: stopped after the first segment only
    widget.start().await?;
    sleep(Duration::from_millis(150)).await;
    widget.stop().await?;
    let second = next_export(&mut events).await;

    assert_eq!(first.segment_count, 2);
    assert_eq!(second.segment_count, 1);
    assert_eq!(second.bytes, 10);
    assert_ne!(first.session_id, second.session_id);

    let downloads = fixture.downloads.captured();
    assert_eq!(downloads.len(), 2);
    assert_eq!(downloads[1].data, vec![1u8; 10]);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_replaced_preview_is_revoked() -> Result<()> {
    let fixture = Fixture::new();
    let encoders = Arc::new(ScriptedEncoderFactory::new(vec![(100, 10)]));
    let (widget, task) = RecorderWidget::spawn(WidgetConfig::default(), fixture.host(encoders));
    let mut events = widget.subscribe();

    widget.start().await?;
    sleep(Duration::from_millis(200)).await;
    widget.stop().await?;
    let first = next_export(&mut events).await;

    // Only the preview is live; the download locator was revoked
    assert_eq!(fixture.locators.live_count().await, 1);
    assert!(fixture.locators.resolve(&first.preview).await.is_some());
    assert_ne!(fixture.downloads.captured()[0].link.href, first.preview);

    widget.start().await?;
    sleep(Duration::from_millis(200)).await;
    widget.stop().await?;
    let second = next_export(&mut events).await;

    assert_eq!(fixture.locators.live_count().await, 1);
    assert!(fixture.locators.resolve(&first.preview).await.is_none());
    assert!(fixture.locators.resolve(&second.preview).await.is_some());
    assert_eq!(widget.snapshot().playback, Some(second.preview));

    // Unmounting drops the last preview too
    widget.teardown().await?;
    task.await?;
    assert_eq!(fixture.locators.live_count().await, 0);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_camera_loss_ends_session() -> Result<()> {
    // Setup: synthetic encoder notices when its track stops
    let fixture = Fixture::new();
    let encoders = Arc::new(SyntheticEncoderFactory::new(SyntheticEncoderConfig {
        timeslice: Duration::from_millis(100),
        segment_bytes: 32,
    }));
    let (widget, _task) = RecorderWidget::spawn(WidgetConfig::default(), fixture.host(encoders));
    let mut events = widget.subscribe();

    widget.start().await?;
    sleep(Duration::from_millis(250)).await;

    // Unplug the camera
    for track in fixture.camera.issued_tracks() {
        track.stop();
    }

    let report = next_export(&mut events).await;

    assert_eq!(report.stop_reason, StopReason::EncoderEnded);
    // Segments at 100ms and 200ms, then a full flush when the 300ms tick finds no live track
    assert_eq!(report.segment_count, 3);
    assert_eq!(report.bytes, 96);
    assert!(!widget.snapshot().timer_armed);

    Ok(())
}

#[tokio::test]
async fn test_full_pipeline_writes_download_file() -> Result<()> {
    // Setup: real clock, synthetic host, downloads into a temp directory
    let temp_dir = TempDir::new()?;
    let camera = Arc::new(SyntheticCamera::new(SyntheticCameraConfig::default()));
    let host = Host {
        camera: camera.clone(),
        encoders: Arc::new(SyntheticEncoderFactory::new(SyntheticEncoderConfig {
            timeslice: Duration::from_millis(100),
            segment_bytes: 64,
        })),
        locators: LocatorRegistry::new(),
        downloads: Arc::new(DirectoryDownloads::new(temp_dir.path())),
    };
    let config = WidgetConfig {
        max_duration: Duration::from_millis(350),
        ..Default::default()
    };

    let (widget, task) = RecorderWidget::spawn(config, host);
    let mut events = widget.subscribe();

    widget.start().await?;
    let report = tokio::time::timeout(Duration::from_secs(5), next_export(&mut events)).await?;

    assert_eq!(report.stop_reason, StopReason::Timeout);
    assert!(report.segment_count >= 1);
    assert!(report.bytes >= 64);

    let path = report
        .download
        .and_then(|d| d.path)
        .expect("download should have been written");
    assert!(path.ends_with("recorded-video.webm"));

    let bytes = fs::read(&path)?;
    assert_eq!(bytes.len(), report.bytes);
    assert_eq!(&bytes[..4], &[0x1A, 0x45, 0xDF, 0xA3], "file should start with an EBML header");
    assert_eq!(camera.live_tracks(), 0);

    widget.teardown().await?;
    task.await?;

    Ok(())
}
