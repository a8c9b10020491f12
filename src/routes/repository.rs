//! Repository resolution endpoints.
//!
//! - POST /api/v1/resolve { page, previous?, token?, show_in_non_code_page? }
//!   Resolves the repository and branch of the page. `repo` is null for pages
//!   that are not repositories. The result becomes the active context.
//!
//! - POST /api/v1/file { page, path }
//!   Where to navigate to open a file.
//!
//! - GET /api/v1/token-url?page=<href>
//!   Page on the host where an access token can be created.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{FileNavigation, PageLocation, PageSnapshot, RepoContext};
use crate::state::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/resolve", post(resolve))
        .route("/api/v1/file", post(file_url))
        .route("/api/v1/token-url", get(token_url))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolveRequest {
    page: PageSnapshot,
    #[serde(default)]
    previous: Option<RepoContext>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    show_in_non_code_page: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResolveResponse {
    repo: Option<RepoContext>,
    css_class: &'static str,
    can_load_entire_tree: bool,
}

pub(crate) async fn resolve(
    State(state): State<SharedState>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>> {
    let show = request
        .show_in_non_code_page
        .unwrap_or(state.config.show_in_non_code_page);
    let previous = request.previous.or_else(|| state.active.get());
    // The page changed; nothing is current until it resolves.
    state.active.set(None);

    let repo = state
        .adapter
        .resolve_repo(
            &request.page,
            show,
            previous.as_ref(),
            state.token(request.token.as_deref()),
        )
        .await?;

    state.active.set(repo.clone());

    Ok(Json(ResolveResponse {
        repo,
        css_class: state.adapter.css_class(),
        can_load_entire_tree: state.adapter.can_load_entire_tree(),
    }))
}

#[derive(Debug, Deserialize)]
struct FileRequest {
    page: PageSnapshot,
    path: String,
}

async fn file_url(
    State(state): State<SharedState>,
    Json(request): Json<FileRequest>,
) -> Result<Json<FileNavigation>> {
    Ok(Json(state.adapter.file_url(&request.page, &request.path)?))
}

#[derive(Debug, Deserialize)]
struct TokenUrlQuery {
    page: String,
}

#[derive(Debug, Serialize)]
struct TokenUrlResponse {
    url: String,
}

async fn token_url(
    State(state): State<SharedState>,
    Query(query): Query<TokenUrlQuery>,
) -> Result<Json<TokenUrlResponse>> {
    let location = PageLocation::parse(&query.page)?;
    Ok(Json(TokenUrlResponse {
        url: state.adapter.create_token_url(&location),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::github::api::mock::MockTransport;
    use crate::routes::test_support::state_with;

    fn request(href: &str) -> ResolveRequest {
        serde_json::from_value(json!({ "page": { "href": href } })).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_sets_active_context() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            "https://api.github.com/repos/ovity/octotree",
            json!({ "default_branch": "main" }),
        );
        let state = state_with(mock);

        let Json(response) = resolve(
            State(state.clone()),
            Json(request("https://github.com/ovity/octotree/blob/main/readme.md")),
        )
        .await
        .unwrap();

        let expected = RepoContext::new("ovity", "octotree").with_branch("main");
        assert_eq!(response.repo.as_ref(), Some(&expected));
        assert_eq!(response.css_class, "octotree_github_sidebar");
        assert!(state.active.is_current(&expected));
    }

    #[tokio::test]
    async fn test_resolve_non_repository_page_is_null() {
        let mock = Arc::new(MockTransport::new());
        let state = state_with(mock.clone());

        let Json(response) = resolve(
            State(state.clone()),
            Json(request("https://github.com/ovity/octotree/issues/42")),
        )
        .await
        .unwrap();

        assert!(response.repo.is_none());
        assert!(state.active.get().is_none());
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_previous_context_reused_for_same_repo() {
        let mock = Arc::new(MockTransport::new());
        let state = state_with(mock.clone());
        state
            .active
            .set(Some(RepoContext::new("ovity", "octotree").with_branch("next")));

        let Json(response) = resolve(
            State(state),
            Json(request("https://github.com/ovity/octotree/tree/next/src")),
        )
        .await
        .unwrap();

        assert_eq!(response.repo.unwrap().branch.as_deref(), Some("next"));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_resolve_clears_active_context() {
        let mock = Arc::new(MockTransport::new());
        mock.fail("https://api.github.com/repos/other/repo", 403);
        let state = state_with(mock);
        let old = RepoContext::new("ovity", "octotree").with_branch("main");
        state.active.set(Some(old.clone()));

        let result = resolve(
            State(state.clone()),
            Json(request("https://github.com/other/repo")),
        )
        .await;

        assert!(result.is_err());
        assert!(state.active.get().is_none());
        assert!(!state.active.is_current(&old));
    }
}
