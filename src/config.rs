//! Configuration loaded from `~/.config/octotree/config.toml` (or `--config`).
//!
//! Every field has a default, so a missing file is the same as an empty one.
//! The reserved name lists are host product data and drift over time, which
//! is why they live here and not in the path resolver.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, Result};

const GH_RESERVED_USER_NAMES: &[&str] = &[
    "settings", "orgs", "organizations", "site", "blog", "about", "explore", "styleguide",
    "showcases", "trending", "stars", "dashboard", "notifications", "search", "developer",
    "account", "pulls", "issues", "features", "contact", "security", "join", "login",
    "watching", "new", "integrations",
];
const GH_RESERVED_REPO_NAMES: &[&str] = &["followers", "following", "repositories"];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub token: Option<String>,
    pub show_in_non_code_page: bool,
    pub code_page_types: Vec<String>,
    pub reserved_user_names: Vec<String>,
    pub reserved_repo_names: Vec<String>,
    pub poll_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub fallback_branch: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            show_in_non_code_page: false,
            code_page_types: vec!["tree".to_string(), "blob".to_string()],
            reserved_user_names: GH_RESERVED_USER_NAMES.iter().map(|s| s.to_string()).collect(),
            reserved_repo_names: GH_RESERVED_REPO_NAMES.iter().map(|s| s.to_string()).collect(),
            poll_interval_ms: 200,
            settle_delay_ms: 200,
            fallback_branch: "master".to_string(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the global config path if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match global_config_path() {
                Some(p) if p.is_file() => Self::from_file(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content).map_err(|e| match e {
            AppError::Config(msg) => AppError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| AppError::Config(e.to_string()))?;
        if config.poll_interval_ms == 0 {
            return Err(AppError::Config("poll_interval_ms must be positive".to_string()));
        }
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Global config path: `~/.config/octotree/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("octotree").join("config.toml"))
}
