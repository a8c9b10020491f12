//! API route handlers for the sidebar's content script.
//!
//! Each submodule defines routes for a feature area:
//! - `repository`: resolve the page's repository, token and file URLs
//! - `tree`: load a branch or a single directory
//! - `layout`: margin patch that makes room for the sidebar
//! - `navigation`: location reports, page-request notifications,
//!   activation and the event websocket

pub mod layout;
pub mod navigation;
pub mod repository;
pub mod tree;

use axum::Router;

use crate::state::SharedState;

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .merge(repository::routes(state.clone()))
        .merge(tree::routes(state.clone()))
        .merge(layout::routes(state.clone()))
        .merge(navigation::routes(state))
}
