use anyhow::{bail, Result};
use clap::Parser;
use clip_recorder::{
    Config, DirectoryDownloads, ExportReport, Host, LocatorRegistry, RecorderWidget, SyntheticCamera,
    SyntheticEncoderFactory, WidgetEvent, WidgetHandle,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "clip-recorder")]
#[command(about = "Record a short camera clip and save it as a download")]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/clip-recorder")]
    config: String,

    /// Press stop after this many milliseconds instead of waiting for auto-stop
    #[arg(short, long)]
    stop_after_ms: Option<u64>,

    /// Make the camera refuse access
    #[arg(long)]
    deny_camera: bool,

    /// Drive the widget from stdin: Enter presses the button, `q` quits
    #[arg(short, long)]
    interactive: bool,

    /// Print the export report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    let mut camera_config = cfg.camera();
    camera_config.deny |= args.deny_camera;

    info!("Clip Recorder v{}", env!("CARGO_PKG_VERSION"));
    info!("Camera: {}", camera_config.label);
    info!("Auto-stop after {}ms", cfg.recorder.max_duration_ms);
    let downloads = DirectoryDownloads::new(cfg.downloads_dir());
    info!("Downloads go to {}", downloads.dir().display());

    let host = Host {
        camera: Arc::new(SyntheticCamera::new(camera_config)),
        encoders: Arc::new(SyntheticEncoderFactory::new(cfg.encoder())),
        locators: LocatorRegistry::new(),
        downloads: Arc::new(downloads),
    };

    let (widget, task) = RecorderWidget::spawn(cfg.widget(), host);

    let result = if args.interactive {
        run_interactive(&widget, args.json).await
    } else {
        run_once(&widget, args.stop_after_ms, args.json).await
    };

    widget.teardown().await.ok();
    task.await?;

    result
}

/// Press start, optionally press stop, and wait for the export
async fn run_once(widget: &WidgetHandle, stop_after_ms: Option<u64>, json: bool) -> Result<()> {
    let mut events = widget.subscribe();
    widget.start().await?;

    if let Some(ms) = stop_after_ms {
        let stopper = widget.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            if let Err(e) = stopper.stop().await {
                warn!("Failed to press stop: {}", e);
            }
        });
    }

    loop {
        match events.recv().await {
            Ok(WidgetEvent::Exported(report)) => {
                print_report(&report, json)?;
                return Ok(());
            }
            Ok(WidgetEvent::CaptureFailed(e)) => bail!("Camera unavailable: {}", e),
            Ok(WidgetEvent::EncoderFailed(e)) => bail!("Encoder unavailable: {}", e),
            Ok(event) => info!("{:?}", event),
            Err(broadcast::error::RecvError::Lagged(n)) => warn!("Missed {} widget events", n),
            Err(broadcast::error::RecvError::Closed) => bail!("Recorder widget exited"),
        }
    }
}

async fn run_interactive(widget: &WidgetHandle, json: bool) -> Result<()> {
    let mut events = widget.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("[{}]  (Enter to press, q to quit)", widget.snapshot().control().label());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim() == "q" => return Ok(()),
                    Some(_) => {
                        let pressed = widget.press().await?;
                        info!("Pressed \"{}\"", pressed.label());
                    }
                    None => return Ok(()),
                }
            }
            event = events.recv() => {
                match event {
                    Ok(WidgetEvent::StateChanged(_)) => {
                        println!("[{}]", widget.snapshot().control().label());
                    }
                    Ok(WidgetEvent::Exported(report)) => print_report(&report, json)?,
                    Ok(WidgetEvent::CaptureFailed(e)) => warn!("Camera unavailable: {}", e),
                    Ok(event) => info!("{:?}", event),
                    Err(broadcast::error::RecvError::Lagged(n)) => warn!("Missed {} widget events", n),
                    Err(broadcast::error::RecvError::Closed) => return Ok(()),
                }
            }
        }
    }
}

fn print_report(report: &ExportReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Recording finished ({:?})", report.stop_reason);
    println!("  Duration: {:.1}s", report.duration_ms as f64 / 1000.0);
    println!("  Segments: {}", report.segment_count);
    println!("  Size:     {} bytes ({})", report.bytes, report.mime_type);
    println!("  Preview:  {}", report.preview);
    match report.download.as_ref().and_then(|d| d.path.as_ref()) {
        Some(path) => println!("  Saved:    {}", path.display()),
        None => println!("  Saved:    (download failed)"),
    }

    Ok(())
}
