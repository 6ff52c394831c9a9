//! Order editing operations for the Admin API.

use sizeswap_core::{CalculatedLineItemGid, CalculatedOrderGid, OrderGid, VariantGid};
use tracing::instrument;

use super::{
    AdminClient, ShopifyError,
    conversions::{convert_calculated_order, convert_committed_order},
    queries::{
        OrderEditAddVariant, OrderEditBegin, OrderEditCommit, OrderEditSetQuantity,
        format_user_errors, order_edit_add_variant, order_edit_begin, order_edit_commit,
        order_edit_set_quantity,
    },
};
use crate::shopify::types::{CalculatedOrder, CommittedOrder};

impl AdminClient {
    /// Begin an order edit session.
    ///
    /// This starts a new order edit session and returns a `CalculatedOrder`
    /// which tracks the proposed changes until they are committed. Returns
    /// `Ok(None)` when Shopify accepted the call but sent no calculated order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order_edit_begin(
        &self,
        order_id: &OrderGid,
    ) -> Result<Option<CalculatedOrder>, ShopifyError> {
        let variables = order_edit_begin::Variables {
            id: order_id.to_string(),
        };

        let response = self.execute::<OrderEditBegin>(variables).await?;

        let Some(payload) = response.order_edit_begin else {
            return Ok(None);
        };

        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserError(format_user_errors(
                &payload.user_errors,
            )));
        }

        payload
            .calculated_order
            .map(convert_calculated_order)
            .transpose()
    }

    /// Set the quantity of a line item in an order edit.
    ///
    /// Setting quantity to 0 removes the item.
    ///
    /// # Arguments
    ///
    /// * `calculated_order_id` - The ID from `order_edit_begin`
    /// * `line_item_id` - The calculated line item ID
    /// * `quantity` - New quantity
    /// * `restock` - Whether to return removed units to inventory
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors.
    #[instrument(skip(self), fields(calc_order_id = %calculated_order_id, line_item_id = %line_item_id))]
    pub async fn order_edit_set_quantity(
        &self,
        calculated_order_id: &CalculatedOrderGid,
        line_item_id: &CalculatedLineItemGid,
        quantity: i64,
        restock: bool,
    ) -> Result<(), ShopifyError> {
        let variables = order_edit_set_quantity::Variables {
            id: calculated_order_id.to_string(),
            line_item_id: line_item_id.to_string(),
            quantity,
            restock: Some(restock),
        };

        let response = self.execute::<OrderEditSetQuantity>(variables).await?;

        let payload = response
            .order_edit_set_quantity
            .ok_or(ShopifyError::EmptyResponse)?;

        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserError(format_user_errors(
                &payload.user_errors,
            )));
        }

        Ok(())
    }

    /// Add a product variant to an order edit.
    ///
    /// Returns the IDs of the calculated line items that were added.
    ///
    /// # Arguments
    ///
    /// * `calculated_order_id` - The ID from `order_edit_begin`
    /// * `variant_id` - Shopify product variant ID
    /// * `quantity` - Quantity to add
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors.
    #[instrument(skip(self), fields(calc_order_id = %calculated_order_id, variant_id = %variant_id))]
    pub async fn order_edit_add_variant(
        &self,
        calculated_order_id: &CalculatedOrderGid,
        variant_id: &VariantGid,
        quantity: i64,
    ) -> Result<Vec<CalculatedLineItemGid>, ShopifyError> {
        let variables = order_edit_add_variant::Variables {
            id: calculated_order_id.to_string(),
            variant_id: variant_id.to_string(),
            quantity,
            allow_duplicates: Some(true),
        };

        let response = self.execute::<OrderEditAddVariant>(variables).await?;

        let payload = response
            .order_edit_add_variant
            .ok_or(ShopifyError::EmptyResponse)?;

        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserError(format_user_errors(
                &payload.user_errors,
            )));
        }

        Ok(payload
            .calculated_order
            .map(|c| {
                c.added_line_items
                    .nodes
                    .into_iter()
                    .map(|li| CalculatedLineItemGid::new(li.id))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Commit an order edit.
    ///
    /// This applies all the changes made during the edit session.
    ///
    /// # Arguments
    ///
    /// * `calculated_order_id` - The ID from `order_edit_begin`
    /// * `notify_customer` - Whether to send a notification email
    /// * `staff_note` - Optional note for staff (not visible to customer)
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors.
    #[instrument(skip(self), fields(calc_order_id = %calculated_order_id))]
    pub async fn order_edit_commit(
        &self,
        calculated_order_id: &CalculatedOrderGid,
        notify_customer: bool,
        staff_note: Option<&str>,
    ) -> Result<CommittedOrder, ShopifyError> {
        let variables = order_edit_commit::Variables {
            id: calculated_order_id.to_string(),
            notify_customer: Some(notify_customer),
            staff_note: staff_note.map(String::from),
        };

        let response = self.execute::<OrderEditCommit>(variables).await?;

        let payload = response
            .order_edit_commit
            .ok_or(ShopifyError::EmptyResponse)?;

        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserError(format_user_errors(
                &payload.user_errors,
            )));
        }

        payload
            .order
            .map(convert_committed_order)
            .transpose()?
            .ok_or(ShopifyError::EmptyResponse)
    }
}
