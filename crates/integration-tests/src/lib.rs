//! Integration tests for the sizeswap webhook service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sizeswap-integration-tests
//! ```
//!
//! Each test starts the real router on a loopback port with its Admin API
//! client pointed at a `wiremock` server standing in for Shopify, then talks
//! to it over HTTP with `reqwest`.
//!
//! # Test Categories
//!
//! - `replace_dummy` - Placeholder replacement through an order edit
//! - `donation` - Donation ledger updates
//! - `signature` - Webhook HMAC enforcement

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::Value;
use sizeswap_webhooks::{
    config::{DonationConfig, ReconcileConfig, ShopifyAdminConfig, WebhookConfig, WebhookSecret},
    middleware::{HMAC_HEADER, webhook_signature::sign},
    routes,
    state::AppState,
};
use url::Url;
use wiremock::MockServer;

/// A running webhook service backed by a mock Shopify.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub shopify: MockServer,
    secret: Option<String>,
}

impl TestContext {
    /// Start a service without signature verification.
    pub async fn new() -> Self {
        Self::start(None, ReconcileConfig::default()).await
    }

    /// Start a service requiring signatures made with `secret`.
    pub async fn with_secret(secret: &str) -> Self {
        Self::start(Some(secret.to_string()), ReconcileConfig::default()).await
    }

    /// Start a service with custom order edit settings.
    pub async fn with_reconcile(reconcile: ReconcileConfig) -> Self {
        Self::start(None, reconcile).await
    }

    async fn start(secret: Option<String>, reconcile: ReconcileConfig) -> Self {
        let shopify = MockServer::start().await;
        let config = test_config(&shopify, secret.as_deref(), reconcile);
        let state = AppState::new(config).expect("Failed to create application state");

        let listener = tokio::net::TcpListener::bind(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            0,
        ))
        .await
        .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            axum::serve(listener, routes::app(state))
                .await
                .expect("Test server error");
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            shopify,
            secret,
        }
    }

    /// POST a JSON body, signing it when the service has a secret.
    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let raw = body.to_string();
        let mut request = self
            .client
            .post(format!("{}{path}", self.base_url))
            .header("content-type", "application/json");
        if let Some(secret) = &self.secret {
            let signature = sign(secret.as_bytes(), raw.as_bytes()).expect("Failed to sign body");
            request = request.header(HMAC_HEADER, signature);
        }

        let response = request.body(raw).send().await.expect("Request failed");
        read(response).await
    }

    /// POST a JSON body with an explicit (possibly wrong) signature.
    pub async fn post_with_signature(
        &self,
        path: &str,
        body: &Value,
        signature: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut request = self
            .client
            .post(format!("{}{path}", self.base_url))
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            request = request.header(HMAC_HEADER, signature);
        }

        let response = request
            .body(body.to_string())
            .send()
            .await
            .expect("Request failed");
        read(response).await
    }

    /// Operation names of every request Shopify received, in order.
    pub async fn shopify_operations(&self) -> Vec<String> {
        self.shopify
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
            .filter_map(|body| body.get("operationName")?.as_str().map(String::from))
            .collect()
    }
}

async fn read(response: reqwest::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// Service configuration pointed at a mock Shopify.
#[must_use]
pub fn test_config(
    shopify: &MockServer,
    secret: Option<&str>,
    reconcile: ReconcileConfig,
) -> WebhookConfig {
    WebhookConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        shopify: ShopifyAdminConfig {
            store: "test-store.myshopify.com".to_string(),
            api_version: "2025-01".to_string(),
            access_token: SecretString::from("shpat_integration_token"),
            endpoint: Url::parse(&shopify.uri()).ok(),
            timeout: Duration::from_secs(5),
        },
        webhook_secret: secret.map(|s| WebhookSecret(SecretString::from(s))),
        reconcile,
        donation: DonationConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
