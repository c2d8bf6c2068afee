use anyhow::{anyhow, Result};
use tokio::sync::{broadcast, mpsc, watch};

use super::state::{Control, WidgetEvent, WidgetSnapshot};

/// User actions delivered to the widget task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Start,
    Stop,
    Teardown,
}

/// Control surface for a running recorder widget
///
/// Dropping every handle tears the widget down.
#[derive(Clone)]
pub struct WidgetHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<WidgetEvent>,
    snapshot: watch::Receiver<WidgetSnapshot>,
}

impl WidgetHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<Command>,
        events: broadcast::Sender<WidgetEvent>,
        snapshot: watch::Receiver<WidgetSnapshot>,
    ) -> Self {
        Self {
            commands,
            events,
            snapshot,
        }
    }

    /// "Start Recording"
    pub async fn start(&self) -> Result<()> {
        self.send(Command::Start).await
    }

    /// "Stop Recording"
    pub async fn stop(&self) -> Result<()> {
        self.send(Command::Stop).await
    }

    /// Press whichever button is currently shown
    pub async fn press(&self) -> Result<Control> {
        let control = self.snapshot().control();
        match control {
            Control::Start => self.start().await?,
            Control::Stop => self.stop().await?,
        }
        Ok(control)
    }

    /// Unmount the widget, releasing the camera and timer
    pub async fn teardown(&self) -> Result<()> {
        self.send(Command::Teardown).await
    }

    /// Subscribe to widget events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.events.subscribe()
    }

    /// Current widget state
    pub fn snapshot(&self) -> WidgetSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that is notified on every snapshot change
    pub fn watch(&self) -> watch::Receiver<WidgetSnapshot> {
        self.snapshot.clone()
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("Recorder widget has shut down"))
    }
}
