//! Type conversions from GraphQL response types to domain types.
//!
//! IDs coming back from Shopify are trusted to be well-formed GIDs; a node
//! whose ID fails to parse is dropped with a warning rather than failing the
//! whole response.

use sizeswap_core::{
    CalculatedLineItemGid, CalculatedOrderGid, LineItemGid, MetafieldGid, OrderGid, PageGid,
    ProductGid, VariantGid,
};

use super::queries::{
    get_page_metafield, get_pages, metafields_set, order_edit_begin, order_edit_commit,
    search_product_variants, search_products_with_variants,
};
use crate::shopify::{
    ShopifyError,
    types::{CalculatedLineItem, CalculatedOrder, CatalogVariant, CommittedOrder, Metafield, Page},
};

fn gid_error(err: &sizeswap_core::GidError) -> ShopifyError {
    ShopifyError::UserError(format!("unexpected ID from Shopify: {err}"))
}

pub fn convert_calculated_order(
    calc: order_edit_begin::CalculatedOrder,
) -> Result<CalculatedOrder, ShopifyError> {
    let id = CalculatedOrderGid::parse(&calc.id).map_err(|e| gid_error(&e))?;
    let original_order_id = calc
        .original_order
        .and_then(|o| OrderGid::parse(&o.id).ok());

    let line_items = calc
        .line_items
        .nodes
        .into_iter()
        .filter_map(|li| {
            let Ok(id) = CalculatedLineItemGid::parse(&li.id) else {
                tracing::warn!(id = %li.id, "Skipping calculated line item with malformed ID");
                return None;
            };
            let (variant_id, variant_sku) = li
                .variant
                .map(|v| (VariantGid::parse(&v.id).ok(), v.sku))
                .unwrap_or_default();

            Some(CalculatedLineItem {
                id,
                variant_id,
                sku: variant_sku.or(li.sku),
                quantity: li.quantity,
                original_line_item_id: li
                    .original_line_item
                    .and_then(|o| LineItemGid::parse(&o.id).ok()),
            })
        })
        .collect();

    Ok(CalculatedOrder {
        id,
        original_order_id,
        line_items,
    })
}

pub fn convert_committed_order(
    order: order_edit_commit::Order,
) -> Result<CommittedOrder, ShopifyError> {
    Ok(CommittedOrder {
        id: OrderGid::parse(&order.id).map_err(|e| gid_error(&e))?,
        name: order.name,
        line_item_count: order.line_items.nodes.len(),
    })
}

pub fn convert_variant(v: search_product_variants::Variant) -> Option<CatalogVariant> {
    let id = VariantGid::parse(&v.id).ok()?;
    let (product_id, product_title) = v
        .product
        .map(|p| (ProductGid::parse(&p.id).ok(), Some(p.title)))
        .unwrap_or_default();

    Some(CatalogVariant {
        id,
        sku: v.sku,
        title: v.title,
        product_id,
        product_title,
    })
}

pub fn convert_product_variants(
    product: search_products_with_variants::Product,
) -> Vec<CatalogVariant> {
    let product_id = ProductGid::parse(&product.id).ok();
    let product_title = product.title;

    product
        .variants
        .nodes
        .into_iter()
        .filter_map(|v| {
            Some(CatalogVariant {
                id: VariantGid::parse(&v.id).ok()?,
                sku: v.sku,
                title: v.title,
                product_id: product_id.clone(),
                product_title: Some(product_title.clone()),
            })
        })
        .collect()
}

pub fn convert_page(page: get_pages::Page) -> Option<Page> {
    Some(Page {
        id: PageGid::parse(&page.id).ok()?,
        title: page.title,
    })
}

pub fn convert_page_metafield(m: get_page_metafield::Metafield) -> Option<Metafield> {
    Some(Metafield {
        id: MetafieldGid::parse(&m.id).ok()?,
        namespace: m.namespace,
        key: m.key,
        value: m.value,
        metafield_type: m.metafield_type,
    })
}

pub fn convert_written_metafield(m: metafields_set::Metafield) -> Option<Metafield> {
    Some(Metafield {
        id: MetafieldGid::parse(&m.id).ok()?,
        namespace: m.namespace,
        key: m.key,
        value: m.value,
        metafield_type: m.metafield_type,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_calculated_order_prefers_variant_sku() {
        let calc: order_edit_begin::CalculatedOrder = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/CalculatedOrder/10",
            "originalOrder": {"id": "gid://shopify/Order/5"},
            "lineItems": {"nodes": [
                {
                    "id": "gid://shopify/CalculatedLineItem/1",
                    "quantity": 2,
                    "sku": "LINE-SKU",
                    "variant": {"id": "gid://shopify/ProductVariant/7", "sku": "TEE-SIZE"},
                    "originalLineItem": {"id": "gid://shopify/LineItem/3"}
                },
                {
                    "id": "not-a-gid",
                    "quantity": 1,
                    "sku": null,
                    "variant": null,
                    "originalLineItem": null
                },
                {
                    "id": "gid://shopify/CalculatedLineItem/2",
                    "quantity": 1,
                    "sku": "CUSTOM",
                    "variant": null,
                    "originalLineItem": null
                }
            ]}
        }))
        .unwrap();

        let order = convert_calculated_order(calc).unwrap();
        assert_eq!(order.id.numeric_id(), "10");
        assert_eq!(order.original_order_id.unwrap().numeric_id(), "5");
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.line_items[0].sku.as_deref(), Some("TEE-SIZE"));
        assert_eq!(order.line_items[0].quantity, 2);
        assert_eq!(
            order.line_items[0].original_line_item_id.as_ref().unwrap().as_str(),
            "gid://shopify/LineItem/3"
        );
        assert_eq!(order.line_items[1].sku.as_deref(), Some("CUSTOM"));
        assert!(order.line_items[1].variant_id.is_none());
    }

    #[test]
    fn test_convert_product_variants_copies_product() {
        let product: search_products_with_variants::Product =
            serde_json::from_value(serde_json::json!({
                "id": "gid://shopify/Product/9",
                "title": "Tee",
                "variants": {"nodes": [
                    {"id": "gid://shopify/ProductVariant/1", "sku": "TEE-S", "title": "S"},
                    {"id": "gid://shopify/ProductVariant/2", "sku": "TEE-M", "title": "M"}
                ]}
            }))
            .unwrap();

        let variants = convert_product_variants(product);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[1].sku.as_deref(), Some("TEE-M"));
        assert_eq!(variants[1].product_title.as_deref(), Some("Tee"));
        assert_eq!(variants[1].product_id.as_ref().unwrap().numeric_id(), "9");
    }
}
