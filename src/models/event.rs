//! Notifications pushed to event subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A client-side navigation the watcher observed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavigationSignal {
    pub previous_href: String,
    pub previous_hash: String,
    pub href: String,
    pub hash: String,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SidebarEvent {
    /// The host page started a partial-page navigation request.
    RequestStarted,
    /// The host page finished a partial-page navigation request.
    RequestEnded,
    LocationChanged(NavigationSignal),
}
