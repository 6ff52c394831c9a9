//! Scripted in-memory gateway for engine tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use sizeswap_core::{
    CalculatedLineItemGid, CalculatedOrderGid, LineItemGid, OrderGid, ProductGid, VariantGid,
};

use super::CommerceGateway;
use crate::shopify::{
    CalculatedLineItem, CalculatedOrder, CatalogVariant, CommittedOrder, ShopifyError,
};

/// A recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Begin,
    SetQuantity {
        line_item: String,
        quantity: i64,
        restock: bool,
    },
    AddVariant {
        variant: String,
        quantity: i64,
    },
    Commit {
        notify_customer: bool,
        staff_note: Option<String>,
    },
    FindBySku(String),
    FindByTag(String),
    ProductTags(VariantGid),
}

impl Call {
    const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Begin | Self::SetQuantity { .. } | Self::AddVariant { .. } | Self::Commit { .. }
        )
    }
}

/// Gateway whose answers are configured up front.
#[derive(Default)]
pub struct FakeGateway {
    calculated_lines: Option<Vec<CalculatedLineItem>>,
    begin_fails: bool,
    commit_fails: bool,
    sku_lookups_fail: bool,
    by_sku: HashMap<String, CatalogVariant>,
    by_tag: HashMap<String, Vec<CatalogVariant>>,
    product_tags: HashMap<VariantGid, Vec<String>>,
    failing_set_quantity: HashSet<CalculatedLineItemGid>,
    failing_add: HashSet<VariantGid>,
    calls: Mutex<Vec<Call>>,
}

fn scripted_failure(what: &str) -> ShopifyError {
    ShopifyError::UserError(format!("scripted failure: {what}"))
}

impl FakeGateway {
    /// Make `begin_edit` return a calculated order with these lines.
    pub fn with_calculated_order(mut self, lines: Vec<CalculatedLineItem>) -> Self {
        self.calculated_lines = Some(lines);
        self
    }

    pub fn with_sku_variant(mut self, variant: CatalogVariant) -> Self {
        let sku = variant.sku.clone().unwrap_or_default();
        self.by_sku.insert(sku, variant);
        self
    }

    pub fn with_tag_variants(mut self, tag: &str, variants: Vec<CatalogVariant>) -> Self {
        self.by_tag.insert(tag.to_string(), variants);
        self
    }

    pub fn with_product_tags(mut self, variant_id: u64, tags: &[&str]) -> Self {
        self.product_tags.insert(
            VariantGid::new(format!("gid://shopify/ProductVariant/{variant_id}")),
            tags.iter().map(ToString::to_string).collect(),
        );
        self
    }

    pub const fn failing_begin(mut self) -> Self {
        self.begin_fails = true;
        self
    }

    pub const fn failing_commit(mut self) -> Self {
        self.commit_fails = true;
        self
    }

    pub const fn failing_sku_lookups(mut self) -> Self {
        self.sku_lookups_fail = true;
        self
    }

    pub fn failing_set_quantity_for(mut self, line_item: u64) -> Self {
        self.failing_set_quantity.insert(CalculatedLineItemGid::new(format!(
            "gid://shopify/CalculatedLineItem/{line_item}"
        )));
        self
    }

    pub fn failing_add_for(mut self, variant_id: u64) -> Self {
        self.failing_add.insert(VariantGid::new(format!(
            "gid://shopify/ProductVariant/{variant_id}"
        )));
        self
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Order edit calls only, in the order they were made.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn tag_lookups(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::FindByTag(tag) => Some(tag),
                _ => None,
            })
            .collect()
    }

    pub fn tag_fetches(&self) -> Vec<VariantGid> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ProductTags(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl CommerceGateway for FakeGateway {
    async fn begin_edit(
        &self,
        order_id: &OrderGid,
    ) -> Result<Option<CalculatedOrder>, ShopifyError> {
        self.record(Call::Begin);
        if self.begin_fails {
            return Err(scripted_failure("begin"));
        }
        Ok(self.calculated_lines.clone().map(|line_items| CalculatedOrder {
            id: CalculatedOrderGid::new("gid://shopify/CalculatedOrder/900"),
            original_order_id: Some(order_id.clone()),
            line_items,
        }))
    }

    async fn set_quantity(
        &self,
        _calculated_order_id: &CalculatedOrderGid,
        line_item_id: &CalculatedLineItemGid,
        quantity: i64,
        restock: bool,
    ) -> Result<(), ShopifyError> {
        self.record(Call::SetQuantity {
            line_item: line_item_id.to_string(),
            quantity,
            restock,
        });
        if self.failing_set_quantity.contains(line_item_id) {
            return Err(scripted_failure("set quantity"));
        }
        Ok(())
    }

    async fn add_variant(
        &self,
        _calculated_order_id: &CalculatedOrderGid,
        variant_id: &VariantGid,
        quantity: i64,
    ) -> Result<Vec<CalculatedLineItemGid>, ShopifyError> {
        self.record(Call::AddVariant {
            variant: variant_id.to_string(),
            quantity,
        });
        if self.failing_add.contains(variant_id) {
            return Err(scripted_failure("add variant"));
        }
        Ok(vec![CalculatedLineItemGid::new(format!(
            "gid://shopify/CalculatedLineItem/added-{}",
            variant_id.numeric_id()
        ))])
    }

    async fn commit_edit(
        &self,
        _calculated_order_id: &CalculatedOrderGid,
        notify_customer: bool,
        staff_note: Option<&str>,
    ) -> Result<CommittedOrder, ShopifyError> {
        self.record(Call::Commit {
            notify_customer,
            staff_note: staff_note.map(String::from),
        });
        if self.commit_fails {
            return Err(scripted_failure("commit"));
        }
        Ok(CommittedOrder {
            id: OrderGid::new("gid://shopify/Order/42"),
            name: "#1042".to_string(),
            line_item_count: 1,
        })
    }

    async fn find_variant_by_sku(&self, sku: &str) -> Result<Option<CatalogVariant>, ShopifyError> {
        self.record(Call::FindBySku(sku.to_string()));
        if self.sku_lookups_fail {
            return Err(ShopifyError::Timeout);
        }
        Ok(self.by_sku.get(sku).cloned())
    }

    async fn find_variants_by_tag(&self, tag: &str) -> Result<Vec<CatalogVariant>, ShopifyError> {
        self.record(Call::FindByTag(tag.to_string()));
        Ok(self.by_tag.get(tag).cloned().unwrap_or_default())
    }

    async fn product_tags_for_variant(
        &self,
        variant_id: &VariantGid,
    ) -> Result<Vec<String>, ShopifyError> {
        self.record(Call::ProductTags(variant_id.clone()));
        self.product_tags
            .get(variant_id)
            .cloned()
            .ok_or_else(|| ShopifyError::NotFound(format!("product for variant {variant_id}")))
    }
}

/// A calculated line. Lines without a SKU get variant `99 + id`.
pub fn line(
    id: u64,
    sku: Option<&str>,
    quantity: i64,
    original_line_item: Option<u64>,
) -> CalculatedLineItem {
    CalculatedLineItem {
        id: CalculatedLineItemGid::new(format!("gid://shopify/CalculatedLineItem/{id}")),
        variant_id: Some(VariantGid::new(format!(
            "gid://shopify/ProductVariant/{}",
            99 + id
        ))),
        sku: sku.map(String::from),
        quantity,
        original_line_item_id: original_line_item
            .map(|n| LineItemGid::new(format!("gid://shopify/LineItem/{n}"))),
    }
}

/// A catalog variant with the given numeric ID, SKU and title.
pub fn variant(id: u64, sku: &str, title: &str) -> CatalogVariant {
    CatalogVariant {
        id: VariantGid::new(format!("gid://shopify/ProductVariant/{id}")),
        sku: Some(sku.to_string()),
        title: title.to_string(),
        product_id: Some(ProductGid::new("gid://shopify/Product/1")),
        product_title: Some("Placeholder Tee".to_string()),
    }
}
