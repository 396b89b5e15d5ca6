//! Events consumed and notifications emitted by the host loop

use crate::config::sync::FetchOutcome;
use std::path::PathBuf;
use tokio::sync::{broadcast, mpsc};

/// Capacity of the notification channel.
/// Listeners that fall further behind receive a Lagged error.
const CHANNEL_CAPACITY: usize = 64;

/// Inputs to the host loop, processed one at a time in arrival order
#[derive(Debug)]
pub enum AppEvent {
    /// Startup, periodic or manual refresh trigger
    RefreshRequested,
    /// A background fetch finished
    RefreshCompleted { outcome: FetchOutcome },
    /// The user picked an action
    Activate(String),
    /// An `estech://` URL was opened
    OpenUrl(String),
    Shutdown,
}

/// Things listeners (UI, CLI) may want to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The action list was regenerated
    MenuRebuilt {
        version: Option<i64>,
        titles: Vec<String>,
    },
    /// A refresh finished without changing the active configuration
    RefreshUnchanged,
    Launched { command: String, location: PathBuf },
    NotFound { command: String },
    LaunchFailed { command: String, reason: String },
    UnknownCommand(String),
}

/// Cloneable sender half for posting events to the host loop
#[derive(Clone)]
pub struct AppHandle {
    sender: mpsc::UnboundedSender<AppEvent>,
}

impl AppHandle {
    pub(crate) fn new(sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { sender }
    }

    /// Post an event. Returns `false` once the loop has stopped.
    pub fn send(&self, event: AppEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    pub fn refresh(&self) -> bool {
        self.send(AppEvent::RefreshRequested)
    }

    pub fn activate(&self, command: impl Into<String>) -> bool {
        self.send(AppEvent::Activate(command.into()))
    }

    pub fn open_url(&self, url: impl Into<String>) -> bool {
        self.send(AppEvent::OpenUrl(url.into()))
    }

    pub fn shutdown(&self) -> bool {
        self.send(AppEvent::Shutdown)
    }
}

/// Broadcasts notifications to every subscriber. Emitting never blocks.
#[derive(Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn emit(&self, notification: Notification) {
        tracing::trace!("Notification emitted: {:?}", notification);
        // Nobody listening is fine
        let _ = self.sender.send(notification);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

/// Next notification for `receiver`, skipping past any it lagged behind on.
///
/// Returns `None` once the bus is gone.
pub async fn next_notification(
    receiver: &mut broadcast::Receiver<Notification>,
) -> Option<Notification> {
    loop {
        match receiver.recv().await {
            Ok(notification) => return Some(notification),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Listener lagged, {} notifications dropped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}
