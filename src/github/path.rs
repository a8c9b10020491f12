//! Path resolution: page path -> (owner, name).
//!
//! Pure, no network. Rejections are `None`, never errors.

use std::collections::HashSet;

use crate::config::Config;

/// Host paths that look like `/owner/name` but are product pages.
#[derive(Debug, Clone, Default)]
pub struct ReservedNames {
    users: HashSet<String>,
    repos: HashSet<String>,
}

impl ReservedNames {
    pub fn new<U, R>(users: U, repos: R) -> Self
    where
        U: IntoIterator,
        U::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            users: users.into_iter().map(Into::into).collect(),
            repos: repos.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.reserved_user_names.iter().cloned(),
            config.reserved_repo_names.iter().cloned(),
        )
    }

    pub fn is_reserved(&self, owner: &str, name: &str) -> bool {
        self.users.contains(owner) || self.repos.contains(name)
    }
}

/// `(owner)/(name)[/(page_type)]` taken from the front of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPath<'a> {
    pub owner: &'a str,
    pub name: &'a str,
    pub page_type: Option<&'a str>,
}

pub fn split_repo_path(path: &str) -> Option<RepoPath<'_>> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let name = segments.next()?;
    Some(RepoPath {
        owner,
        name,
        page_type: segments.next(),
    })
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    names: ReservedNames,
    code_page_types: Vec<String>,
}

impl PathResolver {
    pub fn new(names: ReservedNames, code_page_types: Vec<String>) -> Self {
        Self {
            names,
            code_page_types,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ReservedNames::from_config(config),
            config.code_page_types.clone(),
        )
    }

    pub fn resolve<'a>(
        &self,
        path: &'a str,
        not_found: bool,
        show_in_non_code_page: bool,
    ) -> Option<RepoPath<'a>> {
        if not_found {
            return None;
        }

        let repo_path = split_repo_path(path)?;

        if self.names.is_reserved(repo_path.owner, repo_path.name) {
            return None;
        }

        if !show_in_non_code_page {
            if let Some(page_type) = repo_path.page_type {
                if !self.code_page_types.iter().any(|t| t == page_type) {
                    return None;
                }
            }
        }

        Some(repo_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::from_config(&Config::default())
    }

    #[test]
    fn test_owner_and_name() {
        let r = resolver();
        for path in ["/ovity/octotree", "/ovity/octotree/", "/rust-lang/rust"] {
            let resolved = r.resolve(path, false, false).unwrap();
            assert_eq!(resolved.page_type, None);
        }
        let resolved = r.resolve("/ovity/octotree", false, false).unwrap();
        assert_eq!((resolved.owner, resolved.name), ("ovity", "octotree"));
    }

    #[test]
    fn test_reserved_names() {
        let r = resolver();
        assert!(r.resolve("/settings/profile", false, true).is_none());
        assert!(r.resolve("/orgs/ovity", false, true).is_none());
        assert!(r.resolve("/ovity/followers", false, true).is_none());
    }

    #[test]
    fn test_needs_two_segments() {
        let r = resolver();
        assert!(r.resolve("/", false, true).is_none());
        assert!(r.resolve("/ovity", false, true).is_none());
    }

    #[test]
    fn test_not_found_page() {
        assert!(resolver().resolve("/ovity/octotree", true, true).is_none());
    }

    #[test]
    fn test_non_code_pages() {
        let r = resolver();
        let resolved = r.resolve("/ovity/octotree/blob/main/readme.md", false, false).unwrap();
        assert_eq!(resolved.page_type, Some("blob"));
        assert!(r.resolve("/ovity/octotree/tree/main/src", false, false).is_some());
        assert!(r.resolve("/ovity/octotree/issues/42", false, false).is_none());
        assert!(r.resolve("/ovity/octotree/issues/42", false, true).is_some());
    }

    #[test]
    fn test_reserved_names_are_data() {
        let r = PathResolver::new(
            ReservedNames::new(["marketplace"], Vec::<String>::new()),
            vec!["tree".to_string()],
        );
        assert!(r.resolve("/marketplace/actions", false, true).is_none());
        assert!(r.resolve("/settings/profile", false, true).is_some());
    }
}
