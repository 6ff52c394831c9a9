//! Shopify Admin API client (HIGH PRIVILEGE).
//!
//! # Security
//!
//! **This module holds the Shopify Admin API access token.**
//!
//! The token can edit any order and write store content, so the webhook
//! service must only accept signed deliveries in production
//! (`SHOPIFY_WEBHOOK_SECRET`).
//!
//! # Architecture
//!
//! - Operations are hand-written GraphQL documents in [`admin::queries`],
//!   wrapped in `graphql_client` request/response envelopes
//! - Direct API calls to Shopify (no local sync, no retries)
//! - Every call is bounded by the configured timeout
//!
//! # Example
//!
//! ```rust,ignore
//! use sizeswap_webhooks::shopify::AdminClient;
//!
//! let client = AdminClient::new(&config.shopify)?;
//!
//! let calc = client.order_edit_begin(&order_id).await?;
//! client.order_edit_set_quantity(&calc.id, &line.id, 0, false).await?;
//! client.order_edit_commit(&calc.id, false, None).await?;
//! ```

pub mod admin;
pub mod types;

pub use admin::AdminClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Shopify answered with an unexpected HTTP status.
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<graphql_client::Error>),

    /// Response carried neither data nor errors.
    #[error("No data in response")]
    EmptyResponse,

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),

    /// The Admin API endpoint could not be built from the store settings.
    #[error("Invalid Admin API endpoint: {0}")]
    InvalidEndpoint(#[source] url::ParseError),
}

impl ShopifyError {
    /// Whether the failure happened below GraphQL (network, HTTP, decoding).
    ///
    /// Transport failures abort a request; domain failures (`errors`,
    /// `userErrors`, missing resources) are reported per operation.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Timeout
                | Self::Status(_)
                | Self::Parse(_)
                | Self::RateLimited(_)
                | Self::Unauthorized(_)
        )
    }

    /// Short label used as a structured log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        if self.is_transport() {
            "transport"
        } else if matches!(self, Self::InvalidEndpoint(_)) {
            "config"
        } else {
            "domain"
        }
    }
}

fn format_graphql_errors(errors: &[graphql_client::Error]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}
