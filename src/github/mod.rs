//! GitHub (public site and self-hosted instances).

pub mod api;
pub mod branch;
pub mod gitmodules;
pub mod layout;
pub mod path;
pub mod tree;

use std::sync::Arc;

use async_trait::async_trait;

use crate::adapter::HostAdapter;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    BlobResponse, CodeTree, FileNavigation, LayoutInput, LayoutPatch, PageLocation, PageSnapshot,
    RepoContext, RepoMetadata, Submodules, TreeNode, TreeNodeRef, TreeResponse,
};

pub use api::{ApiEndpoint, ApiTransport, HttpTransport};
pub use branch::BranchCache;
pub use path::PathResolver;

pub struct GitHub {
    transport: Arc<dyn ApiTransport>,
    branches: Arc<BranchCache>,
    paths: PathResolver,
    fallback_branch: String,
}

impl GitHub {
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        branches: Arc<BranchCache>,
        config: &Config,
    ) -> Self {
        Self {
            transport,
            branches,
            paths: PathResolver::from_config(config),
            fallback_branch: config.fallback_branch.clone(),
        }
    }

    async fn default_branch(
        &self,
        page: &PageLocation,
        repo: &RepoContext,
        token: Option<&str>,
    ) -> Result<String> {
        let url = ApiEndpoint::for_page(page).repo_url(repo, "");
        tracing::info!("Fetching default branch of {}", repo.key());
        let meta: RepoMetadata = api::get(self.transport.as_ref(), &url, token).await?;
        let branch = meta
            .default_branch
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| self.fallback_branch.clone());
        self.branches.insert(repo.key(), branch.clone());
        Ok(branch)
    }
}

#[async_trait]
impl HostAdapter for GitHub {
    fn css_class(&self) -> &'static str {
        "octotree_github_sidebar"
    }

    fn can_load_entire_tree(&self) -> bool {
        true
    }

    fn create_token_url(&self, page: &PageLocation) -> String {
        format!("{}/settings/tokens/new", page.origin())
    }

    fn file_url(&self, page: &PageSnapshot, path: &str) -> Result<FileNavigation> {
        let location = page.location()?;
        Ok(FileNavigation {
            // full URL so partial navigation works under cross-origin content rules
            url: format!("{}/{}", location.origin(), path.trim_start_matches('/')),
            partial: page.has_partial_container,
        })
    }

    fn update_layout(&self, input: &LayoutInput) -> LayoutPatch {
        layout::update_layout(input)
    }

    async fn resolve_repo(
        &self,
        page: &PageSnapshot,
        show_in_non_code_page: bool,
        previous: Option<&RepoContext>,
        token: Option<&str>,
    ) -> Result<Option<RepoContext>> {
        let location = page.location()?;

        let Some(repo_path) =
            self.paths
                .resolve(&location.path, page.not_found, show_in_non_code_page)
        else {
            tracing::debug!("Not a repository page: {}", location.path);
            return Ok(None);
        };

        let repo = RepoContext::new(repo_path.owner, repo_path.name);

        if let Some((branch, source)) = branch::branch_without_api(
            &page.branch,
            previous,
            &repo.owner,
            &repo.name,
            &self.branches,
        ) {
            tracing::debug!("Branch of {} is {} ({:?})", repo.key(), branch, source);
            return Ok(Some(repo.with_branch(branch)));
        }

        let branch = self.default_branch(&location, &repo, token).await?;
        Ok(Some(repo.with_branch(branch)))
    }

    async fn load_code_tree(
        &self,
        page: &PageLocation,
        repo: &RepoContext,
        node: Option<&TreeNodeRef>,
        token: Option<&str>,
    ) -> Result<CodeTree> {
        let branch = match repo.branch.as_deref() {
            Some(b) if repo.is_resolved() => b,
            _ => {
                return Err(AppError::InvalidRequest(format!(
                    "{} has no branch",
                    repo.key()
                )));
            }
        };

        let url = ApiEndpoint::for_page(page).repo_url(repo, &tree::tree_path(branch, node)?);
        let response: TreeResponse = api::get(self.transport.as_ref(), &url, token).await?;
        tracing::debug!("Loaded {} entries for {}", response.tree.len(), repo.key());

        let submodules = if node.is_none() {
            self.load_submodules(page, repo, &response.tree, token).await
        } else {
            None
        };

        Ok(CodeTree {
            repo: repo.clone(),
            tree: response.tree,
            truncated: response.truncated,
            submodules,
        })
    }

    async fn load_submodules(
        &self,
        page: &PageLocation,
        repo: &RepoContext,
        tree: &[TreeNode],
        token: Option<&str>,
    ) -> Option<Submodules> {
        let item = tree::find_gitmodules(tree)?;
        let url = ApiEndpoint::for_page(page).repo_url(repo, &tree::blob_path(&item.sha));

        let loaded = async {
            let blob: BlobResponse = api::get(self.transport.as_ref(), &url, token).await?;
            gitmodules::parse_gitmodules(&tree::decode_blob(&blob.content)?)
        }
        .await;

        match loaded {
            Ok(submodules) => Some(submodules),
            Err(e) => {
                tracing::warn!("Ignoring submodules of {}: {}", repo.key(), e);
                None
            }
        }
    }
}
