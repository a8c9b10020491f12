//! Tree DTOs.
//!
//! - `TreeNode`: one entry of the host's git tree listing
//! - `TreeNodeRef`: the node a caller drills into (absent = branch root)
//! - `TreeItem`: nested node for the sidebar, folded from a flat listing
//! - `Submodule`: remote of a submodule, keyed by its path
//! - `TreeResponse`, `BlobResponse`, `RepoMetadata`: host API bodies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeNode {
    pub path: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Blob,
    Tree,
    /// Gitlink entry, i.e. a submodule.
    Commit,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeNodeRef {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
    Submodule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeItem {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub entry_type: EntryType,
    pub size: Option<u64>,
    pub submodule_url: Option<String>,
    pub children: Option<Vec<TreeItem>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submodule {
    pub name: String,
    pub url: String,
    pub branch: Option<String>,
}

/// Submodule path -> remote.
pub type Submodules = BTreeMap<String, Submodule>;

#[derive(Debug, Clone, Deserialize)]
pub struct TreeResponse {
    pub tree: Vec<TreeNode>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlobResponse {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoMetadata {
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Result of one tree load, tagged with the context it was loaded for.
#[derive(Debug, Clone, Serialize)]
pub struct CodeTree {
    pub repo: super::RepoContext,
    pub tree: Vec<TreeNode>,
    pub truncated: bool,
    pub submodules: Option<Submodules>,
}
