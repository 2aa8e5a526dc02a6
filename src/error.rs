//! Error types for the clip search service.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::web::pages;

/// Service-level errors that can occur during operation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Search failed: {0}")]
    Search(String),

    #[error("Video lookup failed: {0}")]
    VideoLookup(String),

    #[error("Unexpected response from search API: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Service not ready")]
    NotReady,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status used when the error escapes a request handler.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Search(_) | ServiceError::VideoLookup(_) | ServiceError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
            ServiceError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Outermost guard: anything a handler could not recover from is shown as a
/// generic error page.
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        let body = pages::error_page(&format!("An error occurred: {}", self));
        (self.status_code(), Html(body)).into_response()
    }
}
