use axum::{Json, Router, extract::State, routing::post};

use crate::models::{LayoutInput, LayoutPatch};
use crate::state::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/layout", post(update_layout))
        .with_state(state)
}

async fn update_layout(
    State(state): State<SharedState>,
    Json(input): Json<LayoutInput>,
) -> Json<LayoutPatch> {
    Json(state.adapter.update_layout(&input))
}
