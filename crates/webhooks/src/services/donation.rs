//! Running donation total kept in a page metafield.
//!
//! Every paid order adds a share of its total; every cancelled order takes
//! the same share back out. The ledger page is found by title keywords and
//! the total is stored as a `number_decimal` metafield.

use rust_decimal::Decimal;
use serde::Serialize;
use sizeswap_core::{PageGid, donation, donation::AmountError};
use thiserror::Error;
use tracing::instrument;

use crate::config::DonationConfig;
use crate::shopify::{AdminClient, MetafieldWrite, ShopifyError};

const METAFIELD_TYPE: &str = "number_decimal";

/// Whether an order adds to or takes from the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    /// A paid order.
    Contribution,
    /// A cancelled order.
    Reversal,
}

impl Adjustment {
    fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Contribution => amount,
            Self::Reversal => -amount,
        }
    }
}

/// Errors from the donation ledger.
#[derive(Debug, Error)]
pub enum DonationError {
    /// No page title contains all the configured keywords.
    #[error("donation page not found (keywords: {0})")]
    PageNotFound(String),

    /// Shopify could not be read or written.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// The new total cannot be represented.
    #[error("donation arithmetic failed: {0}")]
    Amount(#[from] AmountError),
}

/// Result of one ledger update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationUpdate {
    /// Page holding the metafield.
    pub page_id: PageGid,
    /// Direction of the change.
    pub adjustment: Adjustment,
    /// Donation share of the order total (unrounded).
    pub donation: Decimal,
    /// Total before the update.
    pub previous_total: Decimal,
    /// Total after the update, rounded to cents.
    pub new_total: Decimal,
}

/// Donation ledger backed by the Admin API.
pub struct DonationLedger<'a> {
    client: &'a AdminClient,
    config: &'a DonationConfig,
}

impl<'a> DonationLedger<'a> {
    /// Create a ledger over a client and settings.
    #[must_use]
    pub const fn new(client: &'a AdminClient, config: &'a DonationConfig) -> Self {
        Self { client, config }
    }

    /// Apply the donation share of `order_total` to the stored total.
    ///
    /// A missing or unparsable stored value counts as zero; the written
    /// total never drops below zero.
    ///
    /// # Errors
    ///
    /// Returns [`DonationError::PageNotFound`] if the ledger page is missing,
    /// [`DonationError::Amount`] if the new total is out of range, or
    /// [`DonationError::Shopify`] if reading or writing fails.
    #[instrument(skip(self), fields(order_total = %order_total, adjustment = ?adjustment))]
    pub async fn apply(
        &self,
        order_total: Decimal,
        adjustment: Adjustment,
    ) -> Result<DonationUpdate, DonationError> {
        let page = self
            .client
            .find_page(&self.config.page_keywords)
            .await?
            .ok_or_else(|| DonationError::PageNotFound(self.config.page_keywords.join(",")))?;

        let current = self
            .client
            .page_metafield(&page.id, &self.config.namespace, &self.config.key)
            .await?;
        if current.is_none() {
            tracing::info!(page_id = %page.id, "Donation metafield not set yet, starting from zero");
        }
        let previous_total =
            donation::parse_stored_total(current.as_ref().map(|m| m.value.as_str()));

        let share = donation::donation_for(order_total, self.config.rate)?;
        let new_total = donation::apply_delta(previous_total, adjustment.signed(share))?;

        let owner_id = page.id.to_string();
        self.client
            .set_metafield(MetafieldWrite {
                owner_id: &owner_id,
                namespace: &self.config.namespace,
                key: &self.config.key,
                metafield_type: METAFIELD_TYPE,
                value: donation::format_total(new_total),
            })
            .await?;

        tracing::info!(
            page_id = %page.id,
            page_title = %page.title,
            donation = %share,
            previous_total = %previous_total,
            new_total = %new_total,
            "Donation total updated"
        );

        Ok(DonationUpdate {
            page_id: page.id,
            adjustment,
            donation: share,
            previous_total,
            new_total,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;
    use std::time::Duration;

    use secrecy::SecretString;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ShopifyAdminConfig;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn client(server: &MockServer) -> AdminClient {
        AdminClient::new(&ShopifyAdminConfig {
            store: "test-store.myshopify.com".to_string(),
            api_version: "2025-01".to_string(),
            access_token: SecretString::from("shpat_test_token_value"),
            endpoint: Some(Url::parse(&server.uri()).unwrap()),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    async fn mount_page(server: &MockServer, stored: Option<&str>) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "GetPages"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"pages": {"nodes": [
                    {"id": "gid://shopify/Page/77", "title": "Marble Falls Restoration"}
                ]}}
            })))
            .mount(server)
            .await;

        let metafield = stored.map(|value| {
            json!({
                "id": "gid://shopify/Metafield/5",
                "namespace": "custom",
                "key": "total_donations",
                "value": value,
                "type": "number_decimal"
            })
        });
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "GetPageMetafield"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"page": {"id": "gid://shopify/Page/77", "metafield": metafield}}
            })))
            .mount(server)
            .await;
    }

    async fn expect_write(server: &MockServer, value: &str) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "MetafieldsSet",
                "variables": {"metafields": [{
                    "ownerId": "gid://shopify/Page/77",
                    "namespace": "custom",
                    "key": "total_donations",
                    "type": "number_decimal",
                    "value": value
                }]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"metafieldsSet": {
                    "metafields": [{
                        "id": "gid://shopify/Metafield/5",
                        "namespace": "custom",
                        "key": "total_donations",
                        "value": value,
                        "type": "number_decimal"
                    }],
                    "userErrors": []
                }}
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_contribution_adds_quarter_share() {
        let server = MockServer::start().await;
        mount_page(&server, Some("100.00")).await;
        expect_write(&server, "125.00").await;

        let client = client(&server);
        let config = DonationConfig::default();
        let update = DonationLedger::new(&client, &config)
            .apply(dec("100"), Adjustment::Contribution)
            .await
            .unwrap();

        assert_eq!(update.donation, dec("25"));
        assert_eq!(update.previous_total, dec("100.00"));
        assert_eq!(update.new_total, dec("125.00"));
    }

    #[tokio::test]
    async fn test_missing_metafield_starts_at_zero() {
        let server = MockServer::start().await;
        mount_page(&server, None).await;
        expect_write(&server, "5.00").await;

        let client = client(&server);
        let config = DonationConfig::default();
        let update = DonationLedger::new(&client, &config)
            .apply(dec("19.99"), Adjustment::Contribution)
            .await
            .unwrap();

        assert_eq!(update.new_total, dec("5.00"));
    }

    #[tokio::test]
    async fn test_reversal_never_goes_negative() {
        let server = MockServer::start().await;
        mount_page(&server, Some("10.00")).await;
        expect_write(&server, "0.00").await;

        let client = client(&server);
        let config = DonationConfig::default();
        let update = DonationLedger::new(&client, &config)
            .apply(dec("200"), Adjustment::Reversal)
            .await
            .unwrap();

        assert_eq!(update.new_total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_page_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"pages": {"nodes": [{"id": "gid://shopify/Page/1", "title": "About us"}]}}
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let config = DonationConfig::default();
        let err = DonationLedger::new(&client, &config)
            .apply(dec("10"), Adjustment::Contribution)
            .await
            .unwrap_err();

        assert!(matches!(err, DonationError::PageNotFound(ref k) if k == "marble,falls"));
    }

    #[tokio::test]
    async fn test_total_out_of_range_writes_nothing() {
        let server = MockServer::start().await;
        mount_page(&server, Some(&Decimal::MAX.to_string())).await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "MetafieldsSet"})))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let config = DonationConfig::default();
        let err = DonationLedger::new(&client, &config)
            .apply(dec("100"), Adjustment::Contribution)
            .await
            .unwrap_err();

        assert!(matches!(err, DonationError::Amount(AmountError::Overflow)));
    }
}
