//! Online store pages and their metafields.

use sizeswap_core::PageGid;
use tracing::instrument;

use super::{
    AdminClient, ShopifyError,
    conversions::{convert_page, convert_page_metafield, convert_written_metafield},
    queries::{
        GetPageMetafield, GetPages, MetafieldsSet, format_user_errors, get_page_metafield,
        get_pages, metafields_set,
    },
};
use crate::shopify::types::{Metafield, MetafieldWrite, Page};

/// Pages scanned when looking for a page by title.
const PAGE_SCAN_LIMIT: i64 = 100;

impl AdminClient {
    /// Find the first page whose lowercased title contains every keyword.
    ///
    /// Only the first hundred pages are scanned. Keywords are compared in
    /// lowercase.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(keywords = ?keywords))]
    pub async fn find_page(&self, keywords: &[String]) -> Result<Option<Page>, ShopifyError> {
        let response = self
            .execute::<GetPages>(get_pages::Variables {
                first: PAGE_SCAN_LIMIT,
            })
            .await?;

        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

        Ok(response
            .pages
            .nodes
            .into_iter()
            .find(|page| {
                let title = page.title.to_lowercase();
                keywords.iter().all(|k| title.contains(k.as_str()))
            })
            .and_then(convert_page))
    }

    /// Read a metafield of a page.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the page does not exist, or an error if the API
    /// request fails.
    #[instrument(skip(self), fields(page_id = %page_id))]
    pub async fn page_metafield(
        &self,
        page_id: &PageGid,
        namespace: &str,
        key: &str,
    ) -> Result<Option<Metafield>, ShopifyError> {
        let variables = get_page_metafield::Variables {
            id: page_id.to_string(),
            namespace: namespace.to_string(),
            key: key.to_string(),
        };

        let response = self.execute::<GetPageMetafield>(variables).await?;

        let page = response
            .page
            .ok_or_else(|| ShopifyError::NotFound(format!("page {page_id}")))?;

        Ok(page.metafield.and_then(convert_page_metafield))
    }

    /// Create or overwrite a metafield.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns user errors.
    #[instrument(skip(self, write), fields(owner_id = %write.owner_id, key = %write.key))]
    pub async fn set_metafield(&self, write: MetafieldWrite<'_>) -> Result<Metafield, ShopifyError> {
        let variables = metafields_set::Variables {
            metafields: vec![metafields_set::MetafieldsSetInput {
                owner_id: write.owner_id.to_string(),
                namespace: write.namespace.to_string(),
                key: write.key.to_string(),
                metafield_type: write.metafield_type.to_string(),
                value: write.value,
            }],
        };

        let response = self.execute::<MetafieldsSet>(variables).await?;

        let payload = response
            .metafields_set
            .ok_or(ShopifyError::EmptyResponse)?;

        if !payload.user_errors.is_empty() {
            return Err(ShopifyError::UserError(format_user_errors(
                &payload.user_errors,
            )));
        }

        payload
            .metafields
            .unwrap_or_default()
            .into_iter()
            .find_map(convert_written_metafield)
            .ok_or(ShopifyError::EmptyResponse)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ShopifyAdminConfig;

    async fn client(server: &MockServer) -> AdminClient {
        AdminClient::new(&ShopifyAdminConfig {
            store: "test-store.myshopify.com".to_string(),
            api_version: "2025-01".to_string(),
            access_token: SecretString::from("shpat_test_token_value"),
            endpoint: Some(Url::parse(&server.uri()).unwrap()),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_find_page_matches_all_keywords_case_insensitively() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"pages": {"nodes": [
                    {"id": "gid://shopify/Page/1", "title": "Marble Collection"},
                    {"id": "gid://shopify/Page/2", "title": "Support MARBLE Falls Trail"},
                    {"id": "gid://shopify/Page/3", "title": "Marble Falls again"}
                ]}}
            })))
            .mount(&server)
            .await;

        let keywords = vec!["marble".to_string(), "Falls".to_string()];
        let page = client(&server)
            .await
            .find_page(&keywords)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(page.id.numeric_id(), "2");
    }

    #[tokio::test]
    async fn test_set_metafield_user_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "MetafieldsSet"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"metafieldsSet": {
                    "metafields": [],
                    "userErrors": [{"field": ["metafields", "0", "value"], "message": "is invalid"}]
                }}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .set_metafield(MetafieldWrite {
                owner_id: "gid://shopify/Page/2",
                namespace: "custom",
                key: "total_donations",
                metafield_type: "number_decimal",
                value: "abc".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "User error: metafields.0.value: is invalid"
        );
    }
}
