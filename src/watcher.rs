//! Navigation watcher.
//!
//! The host page swaps content client-side without a full reload and does not
//! reliably announce when it is done, so the current location is polled at a
//! fixed interval. Polling also catches same-page hash changes.
//!
//! The first check only records the location (the initial page load is
//! handled by whoever activated the sidebar). Every later change is reported
//! once, after a settle delay that lets the host finish rendering, as a
//! `SidebarEvent::LocationChanged` on the broadcast channel.
//!
//! The loop runs until `WatcherHandle::stop` is called or the handle is
//! dropped.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::models::{NavigationSignal, ObservedLocation, SidebarEvent};

/// Anything that can report where the page currently is.
pub trait LocationSource: Send + Sync + 'static {
    fn current(&self) -> ObservedLocation;
}

/// The location most recently reported by the content script.
#[derive(Debug, Default)]
pub struct ReportedLocation {
    inner: RwLock<ObservedLocation>,
}

impl ReportedLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, location: ObservedLocation) {
        if let Ok(mut inner) = self.inner.write() {
            *inner = location;
        }
    }
}

impl LocationSource for ReportedLocation {
    fn current(&self) -> ObservedLocation {
        self.inner
            .read()
            .map(|l| l.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum WatchState {
    WaitingFirstCheck,
    Armed(ObservedLocation),
}

impl WatchState {
    /// Record `current`; returns `(previous, current)` if it is a change
    /// worth reporting.
    fn observe(
        &mut self,
        current: ObservedLocation,
    ) -> Option<(ObservedLocation, ObservedLocation)> {
        match self {
            WatchState::WaitingFirstCheck => {
                *self = WatchState::Armed(current);
                None
            }
            WatchState::Armed(last) if *last == current => None,
            WatchState::Armed(last) => {
                let previous = std::mem::replace(last, current.clone());
                Some((previous, current))
            }
        }
    }
}

pub struct NavigationWatcher<S: LocationSource> {
    source: Arc<S>,
    events: broadcast::Sender<SidebarEvent>,
    interval: Duration,
    settle: Duration,
}

impl<S: LocationSource> NavigationWatcher<S> {
    pub fn new(
        source: Arc<S>,
        events: broadcast::Sender<SidebarEvent>,
        interval: Duration,
        settle: Duration,
    ) -> Self {
        Self {
            source,
            events,
            interval,
            settle,
        }
    }

    pub fn start(self) -> WatcherHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        tracing::info!("Navigation watcher started ({:?} interval)", self.interval);
        let task = tokio::spawn(self.run(stop_rx));
        WatcherHandle { stop_tx, task }
    }

    async fn run(self, mut stop: watch::Receiver<bool>) {
        let mut state = WatchState::WaitingFirstCheck;
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stop.changed() => break,
            }

            let Some((previous, current)) = state.observe(self.source.current()) else {
                continue;
            };

            tokio::select! {
                _ = tokio::time::sleep(self.settle) => {}
                _ = stop.changed() => break,
            }

            tracing::debug!("Location changed: {} -> {}", previous.href, current.href);
            let signal = NavigationSignal {
                previous_href: previous.href,
                previous_hash: previous.hash,
                href: current.href,
                hash: current.hash,
                observed_at: chrono::Utc::now(),
            };
            // no subscribers is fine
            let _ = self.events.send(SidebarEvent::LocationChanged(signal));
        }

        tracing::info!("Navigation watcher stopped");
    }
}

pub struct WatcherHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!("Navigation watcher ended abnormally: {}", e);
        }
    }
}
