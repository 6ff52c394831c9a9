//! Shopify Admin API GraphQL client with access-token authentication.
//!
//! This module provides a typed client for the handful of Admin API
//! operations the webhook service needs: order editing, catalog lookups,
//! and page metafields.

use std::sync::Arc;

use graphql_client::GraphQLQuery;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::config::ShopifyAdminConfig;

use super::ShopifyError;

mod catalog;
mod content;
mod conversions;
mod order_editing;
pub mod queries;

/// Shopify Admin API GraphQL client.
///
/// Cheap to clone; all clones share one connection pool.
///
/// # Security
///
/// This client holds the Admin API access token which has HIGH PRIVILEGE
/// access to the store.
#[derive(Clone, Debug)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

#[derive(Debug)]
struct AdminClientInner {
    client: reqwest::Client,
    endpoint: Url,
    store: String,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// Every request carries the access token and is bounded by the
    /// configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value, the
    /// endpoint cannot be built, or the HTTP client fails to initialize.
    pub fn new(config: &ShopifyAdminConfig) -> Result<Self, ShopifyError> {
        let mut token = HeaderValue::from_str(config.access_token.expose_secret())
            .map_err(|_| ShopifyError::Unauthorized("access token is not a valid header".into()))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("X-Shopify-Access-Token", token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let endpoint = config
            .graphql_endpoint()
            .map_err(ShopifyError::InvalidEndpoint)?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                endpoint,
                store: config.store.clone(),
            }),
        })
    }

    /// Get the store domain.
    #[must_use]
    pub fn store(&self) -> &str {
        &self.inner.store
    }

    /// Get the GraphQL endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Execute a GraphQL operation.
    ///
    /// Transport problems (timeouts, non-2xx statuses, undecodable bodies)
    /// are reported separately from GraphQL `errors`.
    #[instrument(skip_all, fields(operation = std::any::type_name::<Q>()))]
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok())
                .map_or(60, |secs| secs.ceil() as u64);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ShopifyError::Unauthorized(
                "Invalid or revoked access token".to_string(),
            ));
        }

        if !status.is_success() {
            return Err(ShopifyError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        let graphql_response: graphql_client::Response<Q::ResponseData> =
            serde_json::from_slice(&bytes)?;

        // Check for GraphQL errors
        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            return Err(ShopifyError::GraphQL(errors));
        }

        graphql_response.data.ok_or(ShopifyError::EmptyResponse)
    }
}

fn map_transport_error(err: reqwest::Error) -> ShopifyError {
    if err.is_timeout() {
        ShopifyError::Timeout
    } else {
        ShopifyError::Http(err)
    }
}
