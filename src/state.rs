//! Shared server state.

use std::sync::{Arc, RwLock};

use tokio::sync::{Mutex, broadcast};

use crate::adapter::HostAdapter;
use crate::config::Config;
use crate::models::{RepoContext, SidebarEvent};
use crate::watcher::{NavigationWatcher, ReportedLocation, WatcherHandle};

/// The context the sidebar is currently showing.
///
/// Tree loads are not cancelled when the user navigates on; a response whose
/// context no longer matches this one must be dropped by the consumer.
#[derive(Debug, Default)]
pub struct ActiveContext {
    inner: RwLock<Option<RepoContext>>,
}

impl ActiveContext {
    pub fn set(&self, repo: Option<RepoContext>) {
        if let Ok(mut inner) = self.inner.write() {
            *inner = repo;
        }
    }

    pub fn get(&self) -> Option<RepoContext> {
        self.inner.read().ok().and_then(|r| r.clone())
    }

    pub fn is_current(&self, repo: &RepoContext) -> bool {
        self.get().as_ref() == Some(repo)
    }
}

pub struct AppState {
    pub adapter: Arc<dyn HostAdapter>,
    pub config: Config,
    pub active: ActiveContext,
    pub location: Arc<ReportedLocation>,
    pub events: broadcast::Sender<SidebarEvent>,
    watcher: Mutex<Option<WatcherHandle>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(adapter: Arc<dyn HostAdapter>, config: Config) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            adapter,
            config,
            active: ActiveContext::default(),
            location: Arc::new(ReportedLocation::new()),
            events,
            watcher: Mutex::new(None),
        }
    }

    /// Token sent with the request wins over the configured one.
    pub fn token<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested
            .filter(|t| !t.is_empty())
            .or(self.config.token.as_deref())
    }

    /// Start or stop the navigation watcher. Idempotent.
    pub async fn set_active(&self, enabled: bool) {
        let mut watcher = self.watcher.lock().await;
        match (enabled, watcher.is_some()) {
            (true, false) => {
                *watcher = Some(
                    NavigationWatcher::new(
                        self.location.clone(),
                        self.events.clone(),
                        self.config.poll_interval(),
                        self.config.settle_delay(),
                    )
                    .start(),
                );
            }
            (false, true) => {
                if let Some(handle) = watcher.take() {
                    handle.stop().await;
                }
                self.active.set(None);
            }
            _ => {}
        }
    }

    pub async fn is_active(&self) -> bool {
        self.watcher
            .lock()
            .await
            .as_ref()
            .is_some_and(WatcherHandle::is_running)
    }
}
