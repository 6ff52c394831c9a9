//! Resolve a placeholder to the concrete catalog variant.

use sizeswap_core::{Placeholder, VariantGid};
use thiserror::Error;

use super::gateway::CommerceGateway;
use crate::shopify::{CatalogVariant, ShopifyError};

/// Why no variant could be located.
#[derive(Debug, Error)]
pub enum LocateError {
    /// Neither the SKU nor the tag search produced a variant.
    #[error("no variant found for sku {sku} (tag {tag})")]
    NotFound {
        /// SKU searched for.
        sku: String,
        /// Tag searched as a fallback.
        tag: String,
    },

    /// The catalog could not be queried.
    #[error("catalog lookup failed: {0}")]
    Remote(#[source] ShopifyError),
}

/// Find the variant a placeholder should be replaced with.
///
/// The resolved SKU is tried first. When that yields nothing (or fails),
/// products carrying the placeholder tag are searched and the best variant
/// is picked by [`pick_tag_candidate`].
///
/// # Errors
///
/// Returns [`LocateError::NotFound`] when both searches come back empty,
/// and [`LocateError::Remote`] when no variant was found and at least one
/// search failed.
pub async fn locate<G>(gateway: &G, placeholder: &Placeholder) -> Result<VariantGid, LocateError>
where
    G: CommerceGateway + ?Sized,
{
    let sku = placeholder.sku.as_str();
    let tag = placeholder.tag.as_str();
    let mut remote_error = None;

    match gateway.find_variant_by_sku(sku).await {
        Ok(Some(variant)) => {
            tracing::debug!(sku, variant_id = %variant.id, "Located variant by SKU");
            return Ok(variant.id);
        }
        Ok(None) => tracing::debug!(sku, tag, "No variant by SKU, searching by tag"),
        Err(e) => {
            tracing::warn!(sku, tag, error = %e, kind = e.kind(), "SKU lookup failed, searching by tag");
            remote_error = Some(e);
        }
    }

    match gateway.find_variants_by_tag(tag).await {
        Ok(candidates) => {
            if let Some(variant) = pick_tag_candidate(candidates, placeholder) {
                tracing::debug!(tag, variant_id = %variant.id, "Located variant by tag");
                return Ok(variant.id);
            }
        }
        Err(e) => {
            tracing::warn!(tag, error = %e, kind = e.kind(), "Tag lookup failed");
            remote_error = Some(e);
        }
    }

    Err(remote_error.map_or_else(
        || LocateError::NotFound {
            sku: sku.to_owned(),
            tag: tag.to_owned(),
        },
        LocateError::Remote,
    ))
}

/// Choose among variants of products carrying the placeholder tag.
///
/// Preference: exact SKU, then a title equal to the size, then the first.
pub fn pick_tag_candidate(
    candidates: Vec<CatalogVariant>,
    placeholder: &Placeholder,
) -> Option<CatalogVariant> {
    let by_sku = candidates
        .iter()
        .position(|v| v.sku.as_deref() == Some(placeholder.sku.as_str()));
    let by_title = || {
        candidates
            .iter()
            .position(|v| placeholder.size.matches_title(&v.title))
    };

    let index = by_sku.or_else(by_title).unwrap_or(0);
    candidates.into_iter().nth(index)
}
