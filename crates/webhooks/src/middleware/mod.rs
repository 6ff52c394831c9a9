//! HTTP middleware for the webhook service.
//!
//! - `request_id` - Request/delivery IDs on spans, Sentry and responses
//! - `webhook_signature` - `X-Shopify-Hmac-Sha256` verification

pub mod request_id;
pub mod webhook_signature;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use webhook_signature::{HMAC_HEADER, verify_webhook_signature};
