//! Unified error handling for the webhook endpoints.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sizeswap_core::{PayloadError, donation::AmountError};
use thiserror::Error;

use crate::reconcile::ReconcileError;
use crate::services::DonationError;
use crate::shopify::ShopifyError;

/// Application-level error type for the webhook service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body is missing fields or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Webhook signature missing or wrong.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The order edit could not be opened or committed.
    #[error("Reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PayloadError> for AppError {
    fn from(err: PayloadError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<AmountError> for AppError {
    fn from(err: AmountError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<DonationError> for AppError {
    fn from(err: DonationError) -> Self {
        match err {
            DonationError::PageNotFound(_) => Self::NotFound(err.to_string()),
            DonationError::Shopify(e) => Self::Shopify(e),
            DonationError::Amount(_) => Self::Internal(err.to_string()),
        }
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Reconcile(_) | Self::Shopify(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to send to the caller.
    fn public_message(&self) -> String {
        match self {
            Self::Reconcile(ReconcileError::Commit { .. }) => {
                "Order edit could not be committed".to_string()
            }
            Self::Reconcile(_) => "Order edit could not be started".to_string(),
            Self::Shopify(_) => "External service error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Validation(msg) | Self::Unauthorized(msg) | Self::NotFound(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Webhook request error"
            );
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Webhook request rejected");
        }

        let body = json!({
            "success": false,
            "error": self.public_message(),
        });

        (status, Json(body)).into_response()
    }
}
