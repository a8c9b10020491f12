//! What the content script observed on the host page.
//!
//! The browser side never sends raw DOM; it sends the handful of values the
//! resolvers need, already read out of the page.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Full `location.href` of the page.
    pub href: String,
    /// The host's not-found page marker was present.
    #[serde(default)]
    pub not_found: bool,
    /// The partial-navigation container exists on the page.
    #[serde(default)]
    pub has_partial_container: bool,
    #[serde(default)]
    pub branch: BranchSignals,
}

/// Branch hints scraped from the page, in the order they are trusted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchSignals {
    /// `title` of the branch/tag switcher.
    #[serde(default)]
    pub selector_title: Option<String>,
    /// `data-branch` of the repository root link.
    #[serde(default)]
    pub root_link_branch: Option<String>,
    /// `href` of the sidebar "Code" link.
    #[serde(default)]
    pub code_tab_href: Option<String>,
}

/// `location.href` and `location.hash` as last reported by the content script.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObservedLocation {
    pub href: String,
    #[serde(default)]
    pub hash: String,
}

/// Where to send the page to open a file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileNavigation {
    pub url: String,
    /// Load through the host's partial-page navigation instead of a full reload.
    pub partial: bool,
}

/// Parsed pieces of a page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    pub scheme: String,
    /// Host including a non-default port.
    pub host: String,
    pub path: String,
    pub hash: String,
}

impl PageSnapshot {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Default::default()
        }
    }

    pub fn location(&self) -> Result<PageLocation> {
        PageLocation::parse(&self.href)
    }
}

impl PageLocation {
    pub fn parse(href: &str) -> Result<Self> {
        let url = Url::parse(href)
            .map_err(|e| AppError::InvalidRequest(format!("bad page url {}: {}", href, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| AppError::InvalidRequest(format!("page url has no host: {}", href)))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            path: url.path().to_string(),
            hash: url.fragment().map(|f| format!("#{}", f)).unwrap_or_default(),
        })
    }

    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        let loc = PageLocation::parse("https://github.com/ovity/octotree/blob/main/readme.md#L3")
            .unwrap();
        assert_eq!(loc.scheme, "https");
        assert_eq!(loc.host, "github.com");
        assert_eq!(loc.path, "/ovity/octotree/blob/main/readme.md");
        assert_eq!(loc.hash, "#L3");
        assert_eq!(loc.origin(), "https://github.com");
    }

    #[test]
    fn test_parse_location_keeps_port() {
        let loc = PageLocation::parse("http://git.corp:8080/team/app").unwrap();
        assert_eq!(loc.host, "git.corp:8080");
        assert_eq!(loc.hash, "");
    }

    #[test]
    fn test_parse_location_rejects_garbage() {
        assert!(matches!(
            PageLocation::parse("not a url"),
            Err(AppError::InvalidRequest(_))
        ));
    }
}
