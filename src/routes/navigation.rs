//! Navigation plumbing between the page and the sidebar.
//!
//! - POST /api/v1/location { href, hash }
//!   Latest location of the page. The navigation watcher polls this.
//!
//! - POST /api/v1/page-request { phase: "start" | "end" }
//!   The host page started or finished a partial-page navigation request.
//!
//! - GET|POST /api/v1/activation { enabled }
//!   Sidebar activation; starts or stops the navigation watcher.
//!
//! - GET /api/v1/events (websocket)
//!   Stream of `SidebarEvent` JSON messages.

use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::Response,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::{ObservedLocation, SidebarEvent};
use crate::state::SharedState;

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/location", post(report_location))
        .route("/api/v1/page-request", post(page_request))
        .route("/api/v1/activation", get(activation).post(set_activation))
        .route("/api/v1/events", get(events))
        .with_state(state)
}

async fn report_location(
    State(state): State<SharedState>,
    Json(location): Json<ObservedLocation>,
) -> StatusCode {
    state.location.report(location);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Phase {
    Start,
    End,
}

#[derive(Debug, Deserialize)]
struct PageRequest {
    phase: Phase,
}

async fn page_request(
    State(state): State<SharedState>,
    Json(request): Json<PageRequest>,
) -> StatusCode {
    let event = match request.phase {
        Phase::Start => SidebarEvent::RequestStarted,
        Phase::End => SidebarEvent::RequestEnded,
    };
    let _ = state.events.send(event);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Serialize, Deserialize)]
struct Activation {
    enabled: bool,
}

async fn activation(State(state): State<SharedState>) -> Json<Activation> {
    Json(Activation {
        enabled: state.is_active().await,
    })
}

async fn set_activation(
    State(state): State<SharedState>,
    Json(request): Json<Activation>,
) -> Json<Activation> {
    state.set_active(request.enabled).await;
    Json(Activation {
        enabled: state.is_active().await,
    })
}

async fn events(ws: WebSocketUpgrade, State(state): State<SharedState>) -> Response {
    let rx = state.events.subscribe();
    ws.on_upgrade(move |socket| forward_events(socket, rx))
}

async fn forward_events(mut socket: WebSocket, mut rx: broadcast::Receiver<SidebarEvent>) {
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!("Dropping unserializable event: {}", e);
                            continue;
                        }
                    };
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event subscriber lagged, {} events skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                _ => {}
            },
        }
    }
}
