//! Inbound webhook payload for placeholder replacement.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{GidError, OrderGid};

/// One order line as delivered by the webhook.
///
/// `sku` is not a real SKU: the storefront flow fills it with the product's
/// tags joined by commas, one of which carries the size marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    /// Order line item ID.
    pub id: String,
    /// Comma-joined product tags.
    #[serde(default)]
    pub sku: String,
    /// Size chosen by the customer, e.g. `"Black / Large"`.
    #[serde(default)]
    pub size: Option<String>,
    /// Variant title, used when `size` is absent or blank.
    #[serde(default)]
    pub variant_title: Option<String>,
    /// Quantity ordered, if the sender included it.
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl LineItemRequest {
    /// The size to resolve: `size` when it is non-blank, else `variantTitle`.
    #[must_use]
    pub fn size_title(&self) -> Option<&str> {
        self.size
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.variant_title.as_deref())
    }

    /// Quantity to add when no matching order line recorded one.
    #[must_use]
    pub fn requested_quantity(&self) -> i64 {
        self.quantity.filter(|q| *q > 0).unwrap_or(1)
    }
}

/// Raw request body before validation.
///
/// Every field is optional so that a missing field produces a precise
/// validation message instead of a serde error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementPayload {
    /// Order being edited.
    pub order_id: Option<String>,
    /// Lines of the order.
    pub line_items: Option<Vec<LineItemRequest>>,
}

/// Errors raised while validating a [`ReplacementPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// `orderId` is absent or blank.
    #[error("missing orderId")]
    MissingOrderId,
    /// `orderId` is present but malformed.
    #[error("invalid orderId: {0}")]
    InvalidOrderId(#[from] GidError),
    /// `lineItems` is absent.
    #[error("missing lineItems")]
    MissingLineItems,
}

/// A validated replacement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementRequest {
    /// Order being edited (normalized GID).
    pub order_id: OrderGid,
    /// Lines of the order, in delivery order.
    pub line_items: Vec<LineItemRequest>,
}

impl TryFrom<ReplacementPayload> for ReplacementRequest {
    type Error = PayloadError;

    fn try_from(payload: ReplacementPayload) -> Result<Self, Self::Error> {
        let order_id = payload
            .order_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(PayloadError::MissingOrderId)?;
        let order_id = OrderGid::parse(&order_id)?;
        let line_items = payload.line_items.ok_or(PayloadError::MissingLineItems)?;

        Ok(Self {
            order_id,
            line_items,
        })
    }
}
