//! Branch resolution from page signals, the previous context and the cache.
//!
//! The page is tried first only to save API calls; the API is the source of
//! truth and is called by the adapter when everything here comes up empty.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{BranchSignals, RepoContext};

/// `owner/name` -> default branch, for the lifetime of the process.
///
/// Concurrent first lookups for the same repository are not coalesced; both
/// may reach the API and the last write wins.
#[derive(Debug, Default)]
pub struct BranchCache {
    entries: Mutex<HashMap<String, String>>,
}

impl BranchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, branch: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.into(), branch.into());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSource {
    SelectorTitle,
    RootLink,
    CodeTabLink,
    Previous,
    Cache,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

/// Fourth non-empty segment of a link path, e.g. `main` in `/o/r/tree/main`.
pub fn branch_from_link(href: &str) -> Option<String> {
    non_empty(href.split('/').filter(|s| !s.is_empty()).nth(3))
}

/// First non-empty of: switcher title, root link, code tab link, previous
/// context of the same repository, cache.
pub fn branch_without_api(
    signals: &BranchSignals,
    previous: Option<&RepoContext>,
    owner: &str,
    name: &str,
    cache: &BranchCache,
) -> Option<(String, BranchSource)> {
    if let Some(b) = non_empty(signals.selector_title.as_deref()) {
        return Some((b, BranchSource::SelectorTitle));
    }
    if let Some(b) = non_empty(signals.root_link_branch.as_deref()) {
        return Some((b, BranchSource::RootLink));
    }
    if let Some(b) = signals.code_tab_href.as_deref().and_then(branch_from_link) {
        return Some((b, BranchSource::CodeTabLink));
    }
    if let Some(b) = previous
        .filter(|p| p.same_repo(owner, name))
        .and_then(|p| non_empty(p.branch.as_deref()))
    {
        return Some((b, BranchSource::Previous));
    }
    cache
        .get(&format!("{}/{}", owner, name))
        .map(|b| (b, BranchSource::Cache))
}
