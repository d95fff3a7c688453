//! Error responses for pages and the JSON API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("{0}")]
    NotFound(String),

    #[error("catalogue unavailable: {0}")]
    Catalogue(#[from] researchbank_common::Error),

    #[error("template error: {0}")]
    Render(#[from] askama::Error),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Catalogue(researchbank_common::Error::NotFound { .. }) => StatusCode::NOT_FOUND,
            WebError::Catalogue(e) if e.is_fetch() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        }

        // the page itself is rendered by the server's error page layer,
        // which knows the prefix and the remembered search
        let message = self.to_string();
        let mut response = (status, message.clone()).into_response();
        response.extensions_mut().insert(ErrorPage { message });
        response
    }
}

/// Marks a plain-text error response to be rendered as an HTML page
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub message: String,
}

/// Same errors, reported as JSON
#[derive(Debug)]
pub struct ApiError(pub WebError);

impl From<WebError> for ApiError {
    fn from(e: WebError) -> Self {
        ApiError(e)
    }
}

impl From<researchbank_common::Error> for ApiError {
    fn from(e: researchbank_common::Error) -> Self {
        ApiError(WebError::Catalogue(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if status.is_server_error() {
            error!("{}", self.0);
        }
        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}
