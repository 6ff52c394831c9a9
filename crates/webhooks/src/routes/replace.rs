//! Placeholder replacement handlers.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::Serialize;
use sizeswap_core::{
    MarkerPattern, ReplacementPayload, ReplacementRequest,
    sizing::{self, ResolutionPreview},
};
use tracing::instrument;

use crate::error::AppError;
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::state::AppState;

/// Build the replacement router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/replace-dummy", post(replace_dummy))
        .route("/replace-dummy/preview", post(preview))
}

/// Response for a reconciliation run.
#[derive(Debug, Serialize)]
pub struct ReplaceResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(flatten)]
    pub report: ReconcileReport,
}

/// Response for a dry-run resolution.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub success: bool,
    pub order_id: String,
    pub pattern: MarkerPattern,
    pub line_items: Vec<ResolutionPreview>,
}

fn validate(
    payload: Result<Json<ReplacementPayload>, JsonRejection>,
) -> Result<ReplacementRequest, AppError> {
    let Json(payload) = payload?;
    tracing::debug!(payload = ?payload, "Replacement payload received");
    Ok(ReplacementRequest::try_from(payload)?)
}

/// Replace every placeholder line of an order with its sized variant.
///
/// # Errors
///
/// Returns 400 for an invalid payload and 500 when the order edit cannot be
/// opened or committed. Per-line failures are reported as counts only.
#[instrument(skip_all, fields(order_id = tracing::field::Empty))]
pub async fn replace_dummy(
    State(state): State<AppState>,
    payload: Result<Json<ReplacementPayload>, JsonRejection>,
) -> Result<Json<ReplaceResponse>, AppError> {
    let request = validate(payload)?;
    tracing::Span::current().record("order_id", request.order_id.as_str());

    let report = Reconciler::new(state.shopify(), &state.config().reconcile)
        .run(&request)
        .await?;

    let message = if report.placeholders == 0 {
        "No placeholder line items"
    } else {
        "Order edit committed"
    };

    tracing::info!(
        state = ?report.state,
        placeholders = report.placeholders,
        added = report.added,
        add_failed = report.add_failed,
        "Replacement finished"
    );

    Ok(Json(ReplaceResponse {
        success: true,
        message,
        report,
    }))
}

/// Resolve the payload's line items without touching Shopify.
///
/// # Errors
///
/// Returns 400 for an invalid payload.
#[instrument(skip_all)]
pub async fn preview(
    State(state): State<AppState>,
    payload: Result<Json<ReplacementPayload>, JsonRejection>,
) -> Result<Json<PreviewResponse>, AppError> {
    let request = validate(payload)?;
    let pattern = state.config().reconcile.pattern;

    let line_items = request
        .line_items
        .iter()
        .map(|item| sizing::preview(item, pattern))
        .collect();

    Ok(Json(PreviewResponse {
        success: true,
        order_id: request.order_id.to_string(),
        pattern,
        line_items,
    }))
}
