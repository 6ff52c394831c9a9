//! Replay a saved webhook payload against the configured store.
//!
//! # Usage
//!
//! ```bash
//! sizeswap replay payload.json
//! ```
//!
//! # Environment Variables
//!
//! Same Shopify and order edit variables as the webhook service:
//! `SHOPIFY_STORE_DOMAIN`, `SHOPIFY_ADMIN_API_TOKEN`, `SHOPIFY_API_VERSION`,
//! `SIZE_MARKER_PATTERN`, `ORDER_EDIT_RESTOCK`, `ORDER_EDIT_NOTIFY_CUSTOMER`,
//! `ORDER_EDIT_STAFF_NOTE`.

use std::path::Path;

use sizeswap_webhooks::{
    config::{ReconcileConfig, ShopifyAdminConfig},
    reconcile::Reconciler,
    shopify::AdminClient,
};

use super::{CommandError, load_payload};

/// Run a full reconciliation for the payload and print the report.
///
/// # Errors
///
/// Returns an error if configuration is missing, the payload is invalid, or
/// the order edit cannot be opened or committed.
#[allow(clippy::print_stdout)]
pub async fn run(path: &Path) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let request = load_payload(path)?;
    let shopify = ShopifyAdminConfig::from_env()?;
    let reconcile = ReconcileConfig::from_env()?;

    tracing::info!(
        store = %shopify.store,
        order_id = %request.order_id,
        line_items = request.line_items.len(),
        "Replaying payload"
    );

    let client = AdminClient::new(&shopify)?;
    let report = Reconciler::new(&client, &reconcile).run(&request).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
