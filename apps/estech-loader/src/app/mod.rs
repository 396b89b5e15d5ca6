//! Host loop
//!
//! Stands in for the menu-bar process: a single task owns the sync engine
//! and the current [`ActionSet`] and handles [`AppEvent`]s one at a time.
//! Remote fetches run on spawned tasks and post their outcome back as
//! [`AppEvent::RefreshCompleted`], so the version comparison and the action
//! rebuild only ever happen on the owning task. When two fetches overlap,
//! whichever outcome arrives last is applied last.

pub mod events;

pub use events::{next_notification, AppEvent, AppHandle, Notification, NotificationBus};

use crate::actions::ActionSet;
use crate::config::sync::{ConfigSyncEngine, RebuildSignal};
use crate::error::LoaderError;
use crate::launcher::{open_target, Resolution};
use crate::platform::traits::{AppLauncher, AppLookup};
use crate::url_scheme::{canonical_command, parse_command};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

pub struct LoaderApp {
    engine: ConfigSyncEngine,
    actions: ActionSet,
    lookup: Arc<dyn AppLookup>,
    launcher: Arc<dyn AppLauncher>,
    sender: mpsc::UnboundedSender<AppEvent>,
    receiver: mpsc::UnboundedReceiver<AppEvent>,
    notifications: NotificationBus,
}

impl LoaderApp {
    /// Seed the engine from local/cached config and build the first action set
    pub fn new(
        mut engine: ConfigSyncEngine,
        lookup: Arc<dyn AppLookup>,
        launcher: Arc<dyn AppLauncher>,
    ) -> Self {
        let active = engine.initialize();
        let actions = ActionSet::from_config(active.as_deref());
        tracing::info!("Menu created with {} actions ({:?})", actions.len(), actions.source());

        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            engine,
            actions,
            lookup,
            launcher,
            sender,
            receiver,
            notifications: NotificationBus::new(),
        }
    }

    pub fn handle(&self) -> AppHandle {
        AppHandle::new(self.sender.clone())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    /// Process events until [`AppEvent::Shutdown`].
    ///
    /// Requests a refresh immediately and then every `refresh_interval`, if set.
    pub async fn run(mut self, refresh_interval: Option<Duration>) {
        match refresh_interval {
            Some(period) => self.start_refresh_timer(period),
            None => {
                let _ = self.sender.send(AppEvent::RefreshRequested);
            }
        }

        while let Some(event) = self.receiver.recv().await {
            if self.dispatch(event).is_break() {
                break;
            }
        }

        tracing::info!("Loader stopped");
    }

    fn start_refresh_timer(&self, period: Duration) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if sender.send(AppEvent::RefreshRequested).is_err() {
                    break;
                }
            }
        });
    }

    fn dispatch(&mut self, event: AppEvent) -> ControlFlow<()> {
        match event {
            AppEvent::RefreshRequested => self.spawn_refresh(),
            AppEvent::RefreshCompleted { outcome } => {
                let signal = self.engine.apply(outcome);
                self.on_refreshed(signal);
            }
            AppEvent::Activate(command) => self.activate(&command),
            AppEvent::OpenUrl(url) => match parse_command(&url) {
                Ok(command) => self.activate(&command),
                Err(e) => {
                    tracing::error!("Ignoring URL: {}", e);
                    self.notifications.emit(Notification::UnknownCommand(url));
                }
            },
            AppEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn spawn_refresh(&self) {
        let fetcher = self.engine.fetcher();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let outcome = fetcher.fetch_latest().await;
            // The loop may have shut down meanwhile
            let _ = sender.send(AppEvent::RefreshCompleted { outcome });
        });
    }

    fn on_refreshed(&mut self, signal: RebuildSignal) {
        match signal {
            RebuildSignal::Rebuild => {
                let active = self.engine.active();
                self.actions = ActionSet::from_config(active.as_deref());
                tracing::info!("Menu rebuilt with {} actions", self.actions.len());
                self.notifications.emit(Notification::MenuRebuilt {
                    version: active.map(|c| c.version),
                    titles: self.actions.iter().map(|a| a.title.clone()).collect(),
                });
            }
            RebuildSignal::NoRebuild => self.notifications.emit(Notification::RefreshUnchanged),
        }
    }

    /// Resolves and launches on the blocking pool; the loop keeps handling
    /// events while Spotlight or `open` run.
    fn activate(&self, command: &str) {
        let command = canonical_command(&command.to_lowercase()).to_string();
        let Some(action) = self.actions.find(&command) else {
            tracing::error!("Unknown command: {}", command);
            self.notifications.emit(Notification::UnknownCommand(command));
            return;
        };

        let target = action.target.clone();
        let lookup = self.lookup.clone();
        let launcher = self.launcher.clone();
        let notifications = self.notifications.clone();
        tokio::task::spawn_blocking(move || {
            let result = open_target(&target, lookup.as_ref(), launcher.as_ref());
            notifications.emit(launch_notification(command, result));
        });
    }
}

fn launch_notification(command: String, result: crate::error::Result<Resolution>) -> Notification {
    match result {
        Ok(Resolution::Found(target)) => Notification::Launched {
            command,
            location: target.location,
        },
        Ok(Resolution::NotFound) => Notification::NotFound { command },
        Err(LoaderError::LaunchFailed { reason, .. }) => {
            tracing::error!("Launch of {} failed: {}", command, reason);
            Notification::LaunchFailed { command, reason }
        }
        Err(e) => {
            tracing::error!("Launch of {} failed: {}", command, e);
            Notification::LaunchFailed {
                command,
                reason: e.to_string(),
            }
        }
    }
}
