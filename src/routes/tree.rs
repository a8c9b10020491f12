//! Tree endpoint.
//!
//! - POST /api/v1/tree { page, repo, node?, submodules?, token? }
//!   Loads the whole branch (no `node`) or one directory. Only the branch load
//!   reads `.gitmodules`; directory loads use the `submodules` map the client
//!   got from it. The response echoes
//!   the context it was loaded for and flags whether that is still the active
//!   one; the sidebar drops responses with `current: false`.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::github::tree::nest_tree;
use crate::models::{CodeTree, PageLocation, RepoContext, Submodules, TreeItem, TreeNodeRef};
use crate::state::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/tree", post(load_tree))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeRequest {
    /// `location.href` of the page the request comes from.
    page: String,
    repo: RepoContext,
    #[serde(default)]
    node: Option<TreeNodeRef>,
    #[serde(default)]
    submodules: Option<Submodules>,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TreeResponseBody {
    #[serde(flatten)]
    tree: CodeTree,
    items: Vec<TreeItem>,
    current: bool,
}

pub(crate) async fn load_tree(
    State(state): State<SharedState>,
    Json(request): Json<TreeRequest>,
) -> Result<Json<TreeResponseBody>> {
    let location = PageLocation::parse(&request.page)?;
    let mut tree = state
        .adapter
        .load_code_tree(
            &location,
            &request.repo,
            request.node.as_ref(),
            state.token(request.token.as_deref()),
        )
        .await?;
    if tree.submodules.is_none() {
        tree.submodules = request.submodules;
    }

    let base_path = request
        .node
        .as_ref()
        .and_then(|n| n.path.as_deref())
        .unwrap_or("");
    let items = nest_tree(
        &tree.tree,
        base_path,
        request.node.is_none(),
        tree.submodules.as_ref(),
    );
    let current = state.active.is_current(&tree.repo);
    if !current {
        tracing::debug!("Tree for {} is stale", tree.repo.key());
    }

    Ok(Json(TreeResponseBody {
        tree,
        items,
        current,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::github::api::mock::MockTransport;
    use crate::routes::test_support::state_with;

    #[tokio::test]
    async fn test_stale_tree_is_flagged() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            "https://api.github.com/repos/ovity/octotree/git/trees/main?recursive=1",
            json!({ "tree": [
                { "path": "src", "sha": "t1", "type": "tree" },
                { "path": "src/lib.rs", "sha": "b1", "type": "blob", "size": 12 }
            ] }),
        );
        let state = state_with(mock);
        let repo = RepoContext::new("ovity", "octotree").with_branch("main");
        let request: TreeRequest = serde_json::from_value(json!({
            "page": "https://github.com/ovity/octotree",
            "repo": repo,
        }))
        .unwrap();

        state.active.set(Some(repo.clone()));
        let Json(body) = load_tree(State(state.clone()), Json(request)).await.unwrap();
        assert!(body.current);
        assert_eq!(body.items.len(), 1);
        assert_eq!(body.items[0].children.as_ref().unwrap()[0].path, "src/lib.rs");

        state
            .active
            .set(Some(RepoContext::new("ovity", "elsewhere").with_branch("main")));
        let request: TreeRequest = serde_json::from_value(json!({
            "page": "https://github.com/ovity/octotree",
            "repo": repo,
        }))
        .unwrap();
        let Json(body) = load_tree(State(state), Json(request)).await.unwrap();
        assert!(!body.current);
    }

    #[tokio::test]
    async fn test_directory_load_uses_known_submodules() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            "https://api.github.com/repos/ovity/octotree/git/trees/t1",
            json!({ "tree": [
                { "path": "lib", "sha": "c1", "type": "commit" },
                { "path": "main.rs", "sha": "b1", "type": "blob" }
            ] }),
        );
        let state = state_with(mock.clone());
        let request: TreeRequest = serde_json::from_value(json!({
            "page": "https://github.com/ovity/octotree",
            "repo": { "owner": "ovity", "name": "octotree", "branch": "main" },
            "node": { "sha": "t1", "path": "vendor" },
            "submodules": {
                "vendor/lib": { "name": "vendor/lib", "url": "https://github.com/acme/lib.git" }
            },
        }))
        .unwrap();

        let Json(body) = load_tree(State(state), Json(request)).await.unwrap();
        let lib = body.items.iter().find(|i| i.name == "lib").unwrap();
        assert_eq!(lib.path, "vendor/lib");
        assert_eq!(lib.submodule_url.as_deref(), Some("https://github.com/acme/lib.git"));
        assert_eq!(mock.count_matching("/git/blobs/"), 0);
    }
}
