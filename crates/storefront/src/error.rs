//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-class errors to
//! Sentry before responding to the client. Route handlers that can fail
//! return `Result<T, AppError>`.
//!
//! Not-found is deliberately absent from most flows: the content gateway
//! normalizes it into empty/absent values, and page handlers render the
//! not-found view themselves. `AppError::NotFound` exists for the cases
//! where a handler has nothing better to render.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cart::CartError;
use crate::content::ContentError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Content store operation failed.
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Content(_) | Self::Cart(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            // A not-found that leaked through the gateway's normalization
            // is still a 404, not a gateway failure
            Self::Content(ContentError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Content(_) => StatusCode::BAD_GATEWAY,
            Self::Cart(CartError::InvalidPrice { .. }) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Cart(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Content(ContentError::NotFound) | Self::NotFound(_) => "Not found".to_string(),
            Self::Content(_) => "Content service error".to_string(),
            Self::Cart(CartError::InvalidPrice { .. }) => {
                "This item cannot be added to the cart".to_string()
            }
            Self::Cart(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::BadRequest(msg) => msg.clone(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
