//! Donation ledger handlers.
//!
//! Both endpoints take `{ "orderTotal": <number | numeric string> }` and
//! adjust the total stored on the donation page metafield.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use sizeswap_core::donation;
use tracing::instrument;

use crate::error::AppError;
use crate::services::{Adjustment, DonationLedger};
use crate::state::AppState;

/// Build the donation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/update-donation", post(update_donation))
        .route("/cancelled-donation", post(cancelled_donation))
}

/// Response for a ledger update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationResponse {
    pub success: bool,
    pub message: &'static str,
    pub donation: Decimal,
    pub previous_total: Decimal,
    pub new_total: Decimal,
}

/// Add the donation share of a paid order.
///
/// # Errors
///
/// Returns 400 for a missing or invalid `orderTotal`, 404 if the donation
/// page does not exist and 500 if Shopify cannot be read or written.
#[instrument(skip_all)]
pub async fn update_donation(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DonationResponse>, AppError> {
    apply(&state, body, Adjustment::Contribution, "Donation updated successfully").await
}

/// Reverse the donation share of a cancelled order.
///
/// # Errors
///
/// Same as [`update_donation`].
#[instrument(skip_all)]
pub async fn cancelled_donation(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DonationResponse>, AppError> {
    apply(&state, body, Adjustment::Reversal, "Donation reversed successfully").await
}

async fn apply(
    state: &AppState,
    body: Result<Json<Value>, JsonRejection>,
    adjustment: Adjustment,
    message: &'static str,
) -> Result<Json<DonationResponse>, AppError> {
    let Json(body) = body?;
    tracing::debug!(body = %body, "Donation payload received");

    let order_total = donation::parse_order_total(body.get("orderTotal"))?;

    let update = DonationLedger::new(state.shopify(), &state.config().donation)
        .apply(order_total, adjustment)
        .await?;

    Ok(Json(DonationResponse {
        success: true,
        message,
        donation: update.donation,
        previous_total: update.previous_total,
        new_total: update.new_total,
    }))
}
