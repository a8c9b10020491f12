//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` for every failure that is worth surfacing and implements
//! Axum's `IntoResponse` so handlers can return it directly. Pages that are not
//! repositories are not errors; resolvers return `Ok(None)` for them.
//!
//! Error mappings:
//! - `Api`, `Network` → 502 (the host API failed us)
//! - `InvalidRequest` → 400
//! - `Decode`, `Config` → 500
//!
//! The body always carries an `ErrorView` so the sidebar can show the same
//! message it would show for a failed request in the page, including whether
//! the user should be asked for an access token.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("API request failed with status {status}: {message}")]
    Api {
        status: u16,
        message: String,
        rate_limited: bool,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// What the sidebar's error view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub title: String,
    pub message: String,
    pub needs_token: bool,
}

impl ErrorView {
    fn new(title: &str, message: &str, needs_token: bool) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            needs_token,
        }
    }
}

impl AppError {
    pub fn view(&self) -> ErrorView {
        match self {
            AppError::Network(_) => ErrorView::new(
                "Connection error",
                "Cannot connect to website. If your network connection to this website is fine, \
                 maybe there is an outage of the API. Please try again later.",
                false,
            ),
            AppError::Api { status: 401, .. } => ErrorView::new(
                "Invalid token",
                "The token is invalid. Create a new access token and paste it in the sidebar.",
                true,
            ),
            AppError::Api {
                status: 403,
                rate_limited: true,
                ..
            } => ErrorView::new(
                "API limit exceeded",
                "You have exceeded the API hourly limit and need an access token to make extra requests.",
                true,
            ),
            AppError::Api { status: 403, .. } => ErrorView::new(
                "Forbidden",
                "You are not allowed to access the API. You might need to provide an access token.",
                true,
            ),
            AppError::Api { status: 404, .. } => ErrorView::new(
                "Private repository",
                "Accessing private repositories requires an access token.",
                true,
            ),
            AppError::Api { status: 409, .. } => {
                ErrorView::new("Empty repository", "This repository is empty.", false)
            }
            other => ErrorView {
                title: "Error".to_string(),
                message: other.to_string(),
                needs_token: false,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Api { .. } | AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Decode(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let view = self.view();

        let body = Json(json!({
            "error": self.to_string(),
            "title": view.title,
            "message": view.message,
            "needs_token": view.needs_token,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
