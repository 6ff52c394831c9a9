//! Drive one order edit from begin to commit.
//!
//! ```text
//! Idle ─begin─▶ EditOpen ─zero out─▶ ItemsRemoved ─add─▶ ItemsAdded ─commit─▶ Committed
//!   │               │                                          │
//!   └───────────────┴──────────── begin/commit failure ────────┴──▶ Abandoned
//! ```
//!
//! Begin and commit are request-fatal. Failures while removing or adding a
//! single line are logged and the batch continues. There is no rollback: an
//! edit that cannot be committed is left open on Shopify and reported with
//! its calculated order ID.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sizeswap_core::{CalculatedOrderGid, OrderGid, Placeholder, ReplacementRequest, sizing};
use thiserror::Error;
use tracing::instrument;

use super::{gateway::CommerceGateway, locator, matcher};
use crate::config::ReconcileConfig;
use crate::shopify::{CommittedOrder, ShopifyError};

/// Lifecycle of a single edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditState {
    /// Nothing sent to Shopify yet.
    Idle,
    /// A calculated order exists.
    EditOpen,
    /// Matched placeholder lines were zeroed.
    ItemsRemoved,
    /// Replacement variants were added.
    ItemsAdded,
    /// The edit was applied to the order.
    Committed,
    /// The request gave up; any open edit is left for an operator.
    Abandoned,
}

impl EditState {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Abandoned)
    }
}

/// Request-fatal reconciliation failures.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The edit session could not be opened.
    #[error("failed to begin order edit for {order_id}: {source}")]
    BeginEdit {
        /// Order being edited.
        order_id: OrderGid,
        /// Underlying failure.
        #[source]
        source: ShopifyError,
    },

    /// Shopify accepted the begin call but returned no calculated order.
    #[error("order edit for {order_id} returned no calculated order")]
    NoCalculatedOrder {
        /// Order being edited.
        order_id: OrderGid,
    },

    /// The edit could not be committed and was abandoned.
    #[error("failed to commit order edit {calculated_order_id} (abandoned at {abandoned_at}): {source}")]
    Commit {
        /// The calculated order left open on Shopify.
        calculated_order_id: CalculatedOrderGid,
        /// When the request gave up.
        abandoned_at: DateTime<Utc>,
        /// Underlying failure.
        #[source]
        source: ShopifyError,
    },
}

/// Aggregate outcome of a reconciliation.
///
/// Counts only; which items failed is in the logs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Order that was processed.
    pub order_id: OrderGid,
    /// Final state.
    pub state: EditState,
    /// Edit session, if one was opened.
    pub calculated_order_id: Option<CalculatedOrderGid>,
    /// Committed order summary, if committed.
    pub committed_order: Option<CommittedOrder>,
    /// Line items that resolved to a placeholder.
    pub placeholders: usize,
    /// Line items with a placeholder tag that could not be resolved.
    pub unresolved: usize,
    /// Placeholder lines zeroed out.
    pub removed: usize,
    /// Placeholder lines that could not be zeroed.
    pub remove_failed: usize,
    /// Replacement variants added.
    pub added: usize,
    /// Replacements that could not be located or added.
    pub add_failed: usize,
}

impl ReconcileReport {
    fn new(order_id: OrderGid) -> Self {
        Self {
            order_id,
            state: EditState::Idle,
            calculated_order_id: None,
            committed_order: None,
            placeholders: 0,
            unresolved: 0,
            removed: 0,
            remove_failed: 0,
            added: 0,
            add_failed: 0,
        }
    }

    fn advance(&mut self, to: EditState) {
        tracing::debug!(from = ?self.state, to = ?to, "Edit state transition");
        self.state = to;
    }
}

/// Runs placeholder replacement against a [`CommerceGateway`].
pub struct Reconciler<'a, G: ?Sized> {
    gateway: &'a G,
    config: &'a ReconcileConfig,
}

impl<'a, G> Reconciler<'a, G>
where
    G: CommerceGateway + ?Sized,
{
    /// Create a reconciler borrowing a gateway and settings.
    #[must_use]
    pub const fn new(gateway: &'a G, config: &'a ReconcileConfig) -> Self {
        Self { gateway, config }
    }

    /// Replace every placeholder line of the order with its sized variant.
    ///
    /// When no line resolves to a placeholder nothing is sent to Shopify.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when the edit cannot be opened or
    /// committed. Per-line failures only show up in the report counts.
    #[instrument(skip_all, fields(order_id = %request.order_id))]
    pub async fn run(
        &self,
        request: &ReplacementRequest,
    ) -> Result<ReconcileReport, ReconcileError> {
        let mut report = ReconcileReport::new(request.order_id.clone());

        let placeholders = self.resolve_placeholders(request, &mut report);
        if placeholders.is_empty() {
            tracing::info!("No placeholder line items, nothing to edit");
            return Ok(report);
        }

        // Idle -> EditOpen
        let calculated = match self.gateway.begin_edit(&request.order_id).await {
            Ok(Some(calculated)) => calculated,
            Ok(None) => {
                report.advance(EditState::Abandoned);
                tracing::error!("Order edit begin returned no calculated order");
                return Err(ReconcileError::NoCalculatedOrder {
                    order_id: request.order_id.clone(),
                });
            }
            Err(source) => {
                report.advance(EditState::Abandoned);
                tracing::error!(error = %source, kind = source.kind(), "Order edit begin failed");
                return Err(ReconcileError::BeginEdit {
                    order_id: request.order_id.clone(),
                    source,
                });
            }
        };
        report.calculated_order_id = Some(calculated.id.clone());
        report.advance(EditState::EditOpen);

        let plan = matcher::match_line_items(
            self.gateway,
            &calculated.line_items,
            &placeholders,
            self.config.pattern,
        )
        .await;

        // EditOpen -> ItemsRemoved
        let mut blocked: HashSet<usize> = HashSet::new();
        for claim in plan.claims() {
            let record = &claim.record;
            match self
                .gateway
                .set_quantity(
                    &calculated.id,
                    &record.calculated_line_item_id,
                    0,
                    self.config.restock,
                )
                .await
            {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    tracing::warn!(
                        calc_order_id = %calculated.id,
                        line_item_id = %record.calculated_line_item_id,
                        sku = %record.matched_key,
                        error = %e,
                        kind = e.kind(),
                        "Failed to remove placeholder line, its replacement will not be added"
                    );
                    report.remove_failed += 1;
                    blocked.insert(claim.placeholder);
                }
            }
        }
        report.advance(EditState::ItemsRemoved);

        // ItemsRemoved -> ItemsAdded
        for (index, placeholder) in placeholders.iter().enumerate() {
            if blocked.contains(&index) {
                continue;
            }

            let quantity = plan
                .record_for(index)
                .map_or(placeholder.requested_quantity, |r| r.previous_quantity);

            if self
                .add_replacement(&calculated.id, placeholder, quantity)
                .await
            {
                report.added += 1;
            } else {
                report.add_failed += 1;
            }
        }
        report.advance(EditState::ItemsAdded);

        // ItemsAdded -> Committed
        match self
            .gateway
            .commit_edit(
                &calculated.id,
                self.config.notify_customer,
                self.config.staff_note.as_deref(),
            )
            .await
        {
            Ok(order) => {
                tracing::info!(
                    calc_order_id = %calculated.id,
                    order_name = %order.name,
                    removed = report.removed,
                    added = report.added,
                    "Order edit committed"
                );
                report.committed_order = Some(order);
                report.advance(EditState::Committed);
                Ok(report)
            }
            Err(source) => {
                report.advance(EditState::Abandoned);
                let abandoned_at = Utc::now();
                tracing::error!(
                    calc_order_id = %calculated.id,
                    abandoned_at = %abandoned_at,
                    error = %source,
                    kind = source.kind(),
                    "Order edit commit failed, calculated order abandoned"
                );
                Err(ReconcileError::Commit {
                    calculated_order_id: calculated.id,
                    abandoned_at,
                    source,
                })
            }
        }
    }

    fn resolve_placeholders(
        &self,
        request: &ReplacementRequest,
        report: &mut ReconcileReport,
    ) -> Vec<Placeholder> {
        let mut placeholders = Vec::new();
        for item in &request.line_items {
            match sizing::resolve(item, self.config.pattern) {
                Ok(Some(placeholder)) => {
                    tracing::debug!(
                        line_item_id = %placeholder.line_item_id,
                        tag = %placeholder.tag,
                        sku = %placeholder.sku,
                        "Resolved placeholder"
                    );
                    placeholders.push(placeholder);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unresolvable placeholder line");
                    report.unresolved += 1;
                }
            }
        }
        report.placeholders = placeholders.len();
        placeholders
    }

    /// Locate and add one replacement. Returns whether it was added.
    async fn add_replacement(
        &self,
        calculated_order_id: &CalculatedOrderGid,
        placeholder: &Placeholder,
        quantity: i64,
    ) -> bool {
        let variant_id = match locator::locate(self.gateway, placeholder).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(
                    line_item_id = %placeholder.line_item_id,
                    sku = %placeholder.sku,
                    error = %e,
                    "Could not locate replacement variant"
                );
                return false;
            }
        };

        match self
            .gateway
            .add_variant(calculated_order_id, &variant_id, quantity)
            .await
        {
            Ok(_) => {
                tracing::debug!(
                    sku = %placeholder.sku,
                    variant_id = %variant_id,
                    quantity,
                    "Added replacement variant"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    calc_order_id = %calculated_order_id,
                    sku = %placeholder.sku,
                    variant_id = %variant_id,
                    error = %e,
                    kind = e.kind(),
                    "Failed to add replacement variant"
                );
                false
            }
        }
    }
}
