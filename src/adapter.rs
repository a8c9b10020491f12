//! Site-specific integration behind a fixed capability set.
//!
//! One implementation exists per supported host (see `github`). The server
//! only ever talks to `dyn HostAdapter`.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    CodeTree, FileNavigation, LayoutInput, LayoutPatch, PageLocation, PageSnapshot, RepoContext,
    Submodules, TreeNode, TreeNodeRef,
};

#[async_trait]
pub trait HostAdapter: Send + Sync {
    /// CSS class the sidebar root gets on this host.
    fn css_class(&self) -> &'static str;

    /// Whether the host API can return a whole branch in one recursive call.
    fn can_load_entire_tree(&self) -> bool;

    /// Page where the user can create an access token.
    fn create_token_url(&self, page: &PageLocation) -> String;

    /// How to navigate the page to `path` (an absolute path on the host).
    fn file_url(&self, page: &PageSnapshot, path: &str) -> Result<FileNavigation>;

    fn update_layout(&self, input: &LayoutInput) -> LayoutPatch;

    /// Resolve the repository the page belongs to.
    ///
    /// `Ok(None)` means the page is not a repository page (not found, reserved
    /// name, non-code page); that is expected and is not an error.
    async fn resolve_repo(
        &self,
        page: &PageSnapshot,
        show_in_non_code_page: bool,
        previous: Option<&RepoContext>,
        token: Option<&str>,
    ) -> Result<Option<RepoContext>>;

    /// Load the tree of a resolved context, either the whole branch or the
    /// single directory `node` points at.
    async fn load_code_tree(
        &self,
        page: &PageLocation,
        repo: &RepoContext,
        node: Option<&TreeNodeRef>,
        token: Option<&str>,
    ) -> Result<CodeTree>;

    /// Best effort: failures are logged and reported as no submodules.
    async fn load_submodules(
        &self,
        page: &PageLocation,
        repo: &RepoContext,
        tree: &[TreeNode],
        token: Option<&str>,
    ) -> Option<Submodules>;
}
