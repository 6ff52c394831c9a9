//! Domain types for the Shopify Admin API.
//!
//! These are the shapes the rest of the service works with; the raw GraphQL
//! response types live in `admin::queries` and are converted in
//! `admin::conversions`.

use serde::{Deserialize, Serialize};
use sizeswap_core::{
    CalculatedLineItemGid, CalculatedOrderGid, LineItemGid, MetafieldGid, OrderGid, PageGid,
    ProductGid, VariantGid,
};

// =============================================================================
// Order Edit Types
// =============================================================================

/// A calculated order representing an order edit session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatedOrder {
    /// Calculated order ID (used in subsequent mutations).
    pub id: CalculatedOrderGid,
    /// The original order being edited.
    pub original_order_id: Option<OrderGid>,
    /// Line items as Shopify currently sees them.
    pub line_items: Vec<CalculatedLineItem>,
}

/// A line item in an order edit session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatedLineItem {
    /// Calculated line item ID.
    pub id: CalculatedLineItemGid,
    /// Variant ID (absent for custom items and deleted variants).
    pub variant_id: Option<VariantGid>,
    /// Variant SKU, falling back to the line item SKU.
    pub sku: Option<String>,
    /// Current quantity.
    pub quantity: i64,
    /// The order line item this calculated line was derived from.
    pub original_line_item_id: Option<LineItemGid>,
}

impl CalculatedLineItem {
    /// The SKU if it is present and not blank.
    #[must_use]
    pub fn concrete_sku(&self) -> Option<&str> {
        self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Summary of an order after an edit was committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommittedOrder {
    /// Order ID.
    pub id: OrderGid,
    /// Order name (e.g. `#1001`).
    pub name: String,
    /// Number of line items on the committed order.
    pub line_item_count: usize,
}

// =============================================================================
// Catalog Types
// =============================================================================

/// A product variant as returned by catalog lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogVariant {
    /// Variant ID.
    pub id: VariantGid,
    /// Variant SKU.
    pub sku: Option<String>,
    /// Variant title (e.g. `Black / M`).
    pub title: String,
    /// Owning product ID.
    pub product_id: Option<ProductGid>,
    /// Owning product title.
    pub product_title: Option<String>,
}

// =============================================================================
// Content Types
// =============================================================================

/// An online store page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page ID.
    pub id: PageGid,
    /// Page title.
    pub title: String,
}

/// A metafield attached to a store resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metafield {
    /// Metafield ID.
    pub id: MetafieldGid,
    /// Namespace (e.g. `custom`).
    pub namespace: String,
    /// Key within the namespace.
    pub key: String,
    /// Raw stored value.
    pub value: String,
    /// Metafield type (e.g. `number_decimal`).
    pub metafield_type: String,
}

/// Input for writing a single metafield.
#[derive(Debug, Clone)]
pub struct MetafieldWrite<'a> {
    /// Resource that owns the metafield.
    pub owner_id: &'a str,
    /// Namespace.
    pub namespace: &'a str,
    /// Key.
    pub key: &'a str,
    /// Metafield type.
    pub metafield_type: &'a str,
    /// Value to store.
    pub value: String,
}
