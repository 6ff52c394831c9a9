//! Correlate the live calculated order with the placeholders to replace.

use std::collections::HashSet;

use serde::Serialize;
use sizeswap_core::{CalculatedLineItemGid, LineItemGid, MarkerPattern, Placeholder, ResolvedSku};

use super::gateway::CommerceGateway;
use crate::shopify::CalculatedLineItem;

/// A calculated line item claimed by a placeholder.
///
/// `previous_quantity` is captured before the line is zeroed so that the
/// replacement can be added at the same quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Calculated line item to zero out.
    pub calculated_line_item_id: CalculatedLineItemGid,
    /// Resolved SKU of the claiming placeholder.
    pub matched_key: ResolvedSku,
    /// Quantity before removal.
    pub previous_quantity: i64,
}

/// One placeholder's claim on a line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// Index into the placeholder slice.
    pub placeholder: usize,
    /// What was matched.
    pub record: MatchRecord,
}

/// The zero-out plan for an edit session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchPlan {
    claims: Vec<Claim>,
}

impl MatchPlan {
    /// Claims in line item order.
    #[must_use]
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// The record claimed by the placeholder at `index`, if any.
    #[must_use]
    pub fn record_for(&self, index: usize) -> Option<&MatchRecord> {
        self.claims
            .iter()
            .find(|c| c.placeholder == index)
            .map(|c| &c.record)
    }

    /// Number of lines to zero out.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Match calculated line items against placeholders.
///
/// Lines already at zero are ignored. A line with a concrete SKU matches a
/// placeholder with the same resolved SKU. A line whose SKU is itself a
/// placeholder template (`TEE-SIZE`), or that has no SKU, matches by
/// placeholder tag: the template SKU plus its product's tags. Each
/// placeholder is claimed at most once, and when several qualify the one
/// raised for the same order line wins.
pub async fn match_line_items<G>(
    gateway: &G,
    line_items: &[CalculatedLineItem],
    placeholders: &[Placeholder],
    pattern: MarkerPattern,
) -> MatchPlan
where
    G: CommerceGateway + ?Sized,
{
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut plan = MatchPlan::default();

    for item in line_items {
        if item.quantity <= 0 {
            continue;
        }

        let sku = item.concrete_sku();
        let template_sku = sku.filter(|s| pattern.matches(s));

        let candidates: Vec<usize> = if let Some(sku) = sku.filter(|s| !pattern.matches(s)) {
            unclaimed(placeholders, &claimed)
                .filter(|(_, p)| p.sku.as_str() == sku)
                .map(|(i, _)| i)
                .collect()
        } else {
            let mut tags: Vec<String> = template_sku.map(String::from).into_iter().collect();
            if let Some(variant_id) = &item.variant_id {
                match gateway.product_tags_for_variant(variant_id).await {
                    Ok(product_tags) => tags.extend(product_tags),
                    Err(e) => {
                        tracing::warn!(
                            line_item_id = %item.id,
                            variant_id = %variant_id,
                            error = %e,
                            "Could not fetch product tags"
                        );
                    }
                }
            }
            if tags.is_empty() {
                continue;
            }

            let tags: HashSet<&str> = tags.iter().map(String::as_str).collect();
            unclaimed(placeholders, &claimed)
                .filter(|(_, p)| tags.contains(p.tag.as_str()))
                .map(|(i, _)| i)
                .collect()
        };

        let Some(index) = prefer_same_line(&candidates, placeholders, item) else {
            continue;
        };
        let Some(placeholder) = placeholders.get(index) else {
            continue;
        };

        claimed.insert(index);
        tracing::debug!(
            line_item_id = %item.id,
            sku = %placeholder.sku,
            quantity = item.quantity,
            "Matched placeholder line"
        );
        plan.claims.push(Claim {
            placeholder: index,
            record: MatchRecord {
                calculated_line_item_id: item.id.clone(),
                matched_key: placeholder.sku.clone(),
                previous_quantity: item.quantity,
            },
        });
    }

    plan
}

fn unclaimed<'a>(
    placeholders: &'a [Placeholder],
    claimed: &'a HashSet<usize>,
) -> impl Iterator<Item = (usize, &'a Placeholder)> + 'a {
    placeholders
        .iter()
        .enumerate()
        .filter(|(i, _)| !claimed.contains(i))
}

fn prefer_same_line(
    candidates: &[usize],
    placeholders: &[Placeholder],
    item: &CalculatedLineItem,
) -> Option<usize> {
    let same_line = item.original_line_item_id.as_ref().and_then(|original| {
        candidates.iter().copied().find(|&i| {
            placeholders
                .get(i)
                .is_some_and(|p| is_same_line(&p.line_item_id, original))
        })
    });

    same_line.or_else(|| candidates.first().copied())
}

/// Webhook IDs may be bare numbers; compare in GID form.
fn is_same_line(webhook_id: &str, original: &LineItemGid) -> bool {
    LineItemGid::parse(webhook_id).is_ok_and(|id| &id == original)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use sizeswap_core::{LineItemRequest, VariantGid, sizing};

    use super::*;
    use crate::reconcile::testing::{FakeGateway, line};

    const SUBSTRING: MarkerPattern = MarkerPattern::Substring;

    fn placeholder(id: u64, tags: &str, size: &str) -> Placeholder {
        sizing::resolve(
            &LineItemRequest {
                id: id.to_string(),
                sku: tags.to_string(),
                size: Some(size.to_string()),
                variant_title: None,
                quantity: None,
            },
            MarkerPattern::Substring,
        )
        .unwrap()
        .unwrap()
    }

    #[tokio::test]
    async fn test_zero_quantity_lines_are_ignored() {
        let gateway = FakeGateway::default();
        let items = vec![
            line(1, Some("TEE-M"), 0, Some(1)),
            line(2, None, 0, Some(2)),
        ];

        let plan = match_line_items(
            &gateway,
            &items,
            &[placeholder(1, "TEE-SIZE", "M")],
            SUBSTRING,
        )
        .await;

        assert!(plan.is_empty());
        assert!(gateway.tag_fetches().is_empty());
    }

    #[tokio::test]
    async fn test_match_by_sku_records_quantity() {
        let gateway = FakeGateway::default();
        let items = vec![line(1, Some("TEE-M"), 3, Some(1))];

        let plan = match_line_items(
            &gateway,
            &items,
            &[placeholder(1, "TEE-SIZE", "M")],
            SUBSTRING,
        )
        .await;

        assert_eq!(plan.len(), 1);
        let record = plan.record_for(0).unwrap();
        assert_eq!(record.previous_quantity, 3);
        assert_eq!(record.matched_key.as_str(), "TEE-M");
        assert_eq!(
            record.calculated_line_item_id.as_str(),
            "gid://shopify/CalculatedLineItem/1"
        );
    }

    #[tokio::test]
    async fn test_match_by_product_tag() {
        let gateway = FakeGateway::default()
            .with_product_tags(100, &["summer", "TEE-SIZE"]);
        let items = vec![line(1, None, 2, Some(7))];

        let plan = match_line_items(
            &gateway,
            &items,
            &[placeholder(7, "TEE-SIZE", "L")],
            SUBSTRING,
        )
        .await;

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.record_for(0).unwrap().previous_quantity, 2);
        assert_eq!(
            gateway.tag_fetches(),
            vec![VariantGid::new("gid://shopify/ProductVariant/100")]
        );
    }

    #[tokio::test]
    async fn test_template_sku_matches_by_tag() {
        let gateway = FakeGateway::default().with_product_tags(100, &["TEE-SIZE"]);
        let items = vec![line(1, Some("TEE-SIZE"), 2, Some(7))];

        let plan = match_line_items(
            &gateway,
            &items,
            &[placeholder(7, "TEE-SIZE", "M")],
            SUBSTRING,
        )
        .await;

        assert_eq!(plan.len(), 1);
        let record = plan.record_for(0).unwrap();
        assert_eq!(record.previous_quantity, 2);
        assert_eq!(record.matched_key.as_str(), "TEE-M");
    }

    #[tokio::test]
    async fn test_template_sku_matches_without_product_tags() {
        // variant 100 has no scripted tags, so the fetch fails
        let gateway = FakeGateway::default();
        let items = vec![line(1, Some("TEE-SIZE"), 1, None)];

        let plan = match_line_items(
            &gateway,
            &items,
            &[placeholder(7, "TEE-SIZE", "L")],
            SUBSTRING,
        )
        .await;

        assert_eq!(plan.len(), 1);
    }

    #[tokio::test]
    async fn test_suffix_pattern_keeps_inner_marker_sku_concrete() {
        let gateway = FakeGateway::default();
        let items = vec![line(1, Some("SIZE-CHART"), 1, None)];
        let tee = sizing::resolve(
            &LineItemRequest {
                id: "7".to_string(),
                sku: "TEE-SIZE".to_string(),
                size: Some("L".to_string()),
                variant_title: None,
                quantity: None,
            },
            MarkerPattern::Suffix,
        )
        .unwrap()
        .unwrap();

        let plan = match_line_items(&gateway, &items, &[tee], MarkerPattern::Suffix).await;

        assert!(plan.is_empty());
        assert!(gateway.tag_fetches().is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_claimed_once_preferring_same_line() {
        let gateway = FakeGateway::default()
            .with_product_tags(100, &["TEE-SIZE"])
            .with_product_tags(101, &["TEE-SIZE"]);
        // Two identical placeholder products, ordered in sizes S and XL.
        let placeholders = vec![
            placeholder(7, "TEE-SIZE", "S"),
            placeholder(8, "TEE-SIZE", "XL"),
        ];
        let items = vec![line(1, None, 1, Some(8)), line(2, None, 4, Some(7))];

        let plan = match_line_items(&gateway, &items, &placeholders, SUBSTRING).await;

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.record_for(1).unwrap().previous_quantity, 1);
        assert_eq!(plan.record_for(0).unwrap().previous_quantity, 4);
    }

    #[tokio::test]
    async fn test_unmatched_and_failed_tag_fetch_are_left_alone() {
        let gateway = FakeGateway::default().with_product_tags(101, &["mug"]);
        let items = vec![
            line(1, Some("MUG-1"), 1, None),
            line(2, None, 1, None),
            // variant 102 has no scripted tags, so the fetch fails
            line(3, None, 1, None),
        ];

        let plan = match_line_items(
            &gateway,
            &items,
            &[placeholder(7, "TEE-SIZE", "L")],
            SUBSTRING,
        )
        .await;

        assert!(plan.is_empty());
    }

    #[test]
    fn test_is_same_line_normalizes_ids() {
        let original = LineItemGid::new("gid://shopify/LineItem/7");
        assert!(is_same_line("7", &original));
        assert!(is_same_line("gid://shopify/LineItem/7", &original));
        assert!(!is_same_line("8", &original));
        assert!(!is_same_line("", &original));
    }
}
