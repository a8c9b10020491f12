use serde::{Deserialize, Serialize};

/// The repository a page belongs to.
///
/// A context is created for every navigation and is only safe to load a tree
/// for once `branch` is filled in. Later navigations produce a new context
/// rather than mutating this one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RepoContext {
    pub owner: String,
    pub name: String,
    pub branch: Option<String>,
}

impl RepoContext {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            branch: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// `owner/name`, the key used by the branch cache.
    pub fn key(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn is_resolved(&self) -> bool {
        self.branch.as_deref().is_some_and(|b| !b.is_empty())
    }

    pub fn same_repo(&self, owner: &str, name: &str) -> bool {
        self.owner == owner && self.name == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_requires_non_empty_branch() {
        let ctx = RepoContext::new("ovity", "octotree");
        assert!(!ctx.is_resolved());
        assert!(!ctx.clone().with_branch("").is_resolved());
        assert!(ctx.with_branch("main").is_resolved());
    }

    #[test]
    fn test_key() {
        assert_eq!(RepoContext::new("octotree", "octotree").key(), "octotree/octotree");
    }
}
