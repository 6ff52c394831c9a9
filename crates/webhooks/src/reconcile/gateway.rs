//! The outbound surface the reconciliation engine depends on.

use async_trait::async_trait;
use sizeswap_core::{CalculatedLineItemGid, CalculatedOrderGid, OrderGid, VariantGid};

use crate::shopify::{AdminClient, CalculatedOrder, CatalogVariant, CommittedOrder, ShopifyError};

/// Commerce platform operations used while editing an order.
///
/// [`AdminClient`] is the production implementation; tests drive the
/// engine with a scripted in-memory gateway.
#[async_trait]
pub trait CommerceGateway: Send + Sync {
    /// Open an edit session. `None` means the platform returned no draft.
    async fn begin_edit(&self, order_id: &OrderGid)
    -> Result<Option<CalculatedOrder>, ShopifyError>;

    /// Set a calculated line item's quantity (0 removes it).
    async fn set_quantity(
        &self,
        calculated_order_id: &CalculatedOrderGid,
        line_item_id: &CalculatedLineItemGid,
        quantity: i64,
        restock: bool,
    ) -> Result<(), ShopifyError>;

    /// Add a variant to the draft, returning the added line item IDs.
    async fn add_variant(
        &self,
        calculated_order_id: &CalculatedOrderGid,
        variant_id: &VariantGid,
        quantity: i64,
    ) -> Result<Vec<CalculatedLineItemGid>, ShopifyError>;

    /// Apply the draft to the order.
    async fn commit_edit(
        &self,
        calculated_order_id: &CalculatedOrderGid,
        notify_customer: bool,
        staff_note: Option<&str>,
    ) -> Result<CommittedOrder, ShopifyError>;

    /// Look up a variant by SKU.
    async fn find_variant_by_sku(&self, sku: &str) -> Result<Option<CatalogVariant>, ShopifyError>;

    /// List the variants of products carrying `tag`.
    async fn find_variants_by_tag(&self, tag: &str) -> Result<Vec<CatalogVariant>, ShopifyError>;

    /// Tags of the product owning `variant_id`.
    async fn product_tags_for_variant(
        &self,
        variant_id: &VariantGid,
    ) -> Result<Vec<String>, ShopifyError>;
}

#[async_trait]
impl CommerceGateway for AdminClient {
    async fn begin_edit(
        &self,
        order_id: &OrderGid,
    ) -> Result<Option<CalculatedOrder>, ShopifyError> {
        self.order_edit_begin(order_id).await
    }

    async fn set_quantity(
        &self,
        calculated_order_id: &CalculatedOrderGid,
        line_item_id: &CalculatedLineItemGid,
        quantity: i64,
        restock: bool,
    ) -> Result<(), ShopifyError> {
        self.order_edit_set_quantity(calculated_order_id, line_item_id, quantity, restock)
            .await
    }

    async fn add_variant(
        &self,
        calculated_order_id: &CalculatedOrderGid,
        variant_id: &VariantGid,
        quantity: i64,
    ) -> Result<Vec<CalculatedLineItemGid>, ShopifyError> {
        self.order_edit_add_variant(calculated_order_id, variant_id, quantity)
            .await
    }

    async fn commit_edit(
        &self,
        calculated_order_id: &CalculatedOrderGid,
        notify_customer: bool,
        staff_note: Option<&str>,
    ) -> Result<CommittedOrder, ShopifyError> {
        self.order_edit_commit(calculated_order_id, notify_customer, staff_note)
            .await
    }

    async fn find_variant_by_sku(&self, sku: &str) -> Result<Option<CatalogVariant>, ShopifyError> {
        Self::find_variant_by_sku(self, sku).await
    }

    async fn find_variants_by_tag(&self, tag: &str) -> Result<Vec<CatalogVariant>, ShopifyError> {
        Self::find_variants_by_tag(self, tag).await
    }

    async fn product_tags_for_variant(
        &self,
        variant_id: &VariantGid,
    ) -> Result<Vec<String>, ShopifyError> {
        Self::product_tags_for_variant(self, variant_id).await
    }
}
