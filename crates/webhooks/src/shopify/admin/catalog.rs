//! Catalog lookups: variants by SKU, products by tag, tags by variant.

use sizeswap_core::VariantGid;
use tracing::instrument;

use super::{
    AdminClient, ShopifyError,
    conversions::{convert_product_variants, convert_variant},
    queries::{
        GetVariantProductTags, SearchProductVariants, SearchProductsWithVariants,
        get_variant_product_tags, search_product_variants, search_products_with_variants,
    },
};
use crate::shopify::types::CatalogVariant;

/// How many candidates to ask for when searching.
const SEARCH_LIMIT: i64 = 10;

/// Escape a value for use inside a double-quoted search term.
fn quote_search_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

impl AdminClient {
    /// Find the variant whose SKU is `sku`.
    ///
    /// Shopify's search is fuzzy, so up to ten candidates are fetched and
    /// only an exact SKU match is returned. Near misses yield `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(sku = %sku))]
    pub async fn find_variant_by_sku(
        &self,
        sku: &str,
    ) -> Result<Option<CatalogVariant>, ShopifyError> {
        let variables = search_product_variants::Variables {
            query: format!("sku:{}", quote_search_value(sku)),
            first: SEARCH_LIMIT,
        };

        let response = self.execute::<SearchProductVariants>(variables).await?;

        let candidates: Vec<CatalogVariant> = response
            .product_variants
            .nodes
            .into_iter()
            .filter_map(convert_variant)
            .collect();

        let exact = candidates
            .into_iter()
            .find(|v| v.sku.as_deref() == Some(sku));
        if exact.is_none() {
            tracing::debug!("No variant with an exact SKU match");
        }

        Ok(exact)
    }

    /// Find all variants of products carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(tag = %tag))]
    pub async fn find_variants_by_tag(
        &self,
        tag: &str,
    ) -> Result<Vec<CatalogVariant>, ShopifyError> {
        let variables = search_products_with_variants::Variables {
            query: format!("tag:{}", quote_search_value(tag)),
            first: SEARCH_LIMIT,
        };

        let response = self
            .execute::<SearchProductsWithVariants>(variables)
            .await?;

        Ok(response
            .products
            .nodes
            .into_iter()
            .flat_map(convert_product_variants)
            .collect())
    }

    /// Get the tags of the product that owns `variant_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the variant or its product does not exist.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn product_tags_for_variant(
        &self,
        variant_id: &VariantGid,
    ) -> Result<Vec<String>, ShopifyError> {
        let variables = get_variant_product_tags::Variables {
            id: variant_id.to_string(),
        };

        let response = self.execute::<GetVariantProductTags>(variables).await?;

        response
            .product_variant
            .and_then(|v| v.product)
            .map(|p| p.tags)
            .ok_or_else(|| ShopifyError::NotFound(format!("product for variant {variant_id}")))
    }
}
