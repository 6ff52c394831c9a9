//! Subcommand implementations.

pub mod replay;
pub mod resolve;

use std::path::{Path, PathBuf};

use sizeswap_core::{PayloadError, ReplacementPayload, ReplacementRequest};
use sizeswap_webhooks::{config::ConfigError, reconcile::ReconcileError, shopify::ShopifyError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Payload file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Payload file is not JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload is missing required fields.
    #[error("Invalid payload: {0}")]
    Payload(#[from] PayloadError),

    /// Environment configuration is incomplete.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Admin API client could not be built.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// The order edit could not be opened or committed.
    #[error("Reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),
}

/// Parse and validate a webhook payload.
///
/// # Errors
///
/// Returns an error if the text is not JSON or fails validation.
pub fn parse_payload(raw: &str) -> Result<ReplacementRequest, CommandError> {
    let payload: ReplacementPayload = serde_json::from_str(raw)?;
    Ok(ReplacementRequest::try_from(payload)?)
}

/// Read and validate a webhook payload file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its contents are invalid.
pub fn load_payload(path: &Path) -> Result<ReplacementRequest, CommandError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CommandError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_payload(&raw)
}
