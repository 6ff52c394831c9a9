//! HTTP route handlers for the webhook service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//!
//! # Placeholder replacement
//! POST /api/replace-dummy           - Swap placeholder lines for sized variants
//! POST /api/replace-dummy/preview   - Resolve only, no Shopify calls
//!
//! # Donation ledger
//! POST /api/update-donation         - Add the donation share of a paid order
//! POST /api/cancelled-donation      - Reverse the share of a cancelled order
//! ```
//!
//! Everything under `/api` passes through webhook signature verification.

pub mod donation;
pub mod replace;

use std::time::Duration;

use axum::{
    Router,
    extract::rejection::JsonRejection,
    http::{Request, Response},
    middleware,
    routing::get,
};
use tower_http::{
    limit::RequestBodyLimitLayer,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{
    request_id_middleware, verify_webhook_signature, webhook_signature::MAX_WEBHOOK_BODY,
};
use crate::state::AppState;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// Build the `/api` router, guarded by signature verification.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(replace::router())
        .merge(donation::router())
        .route_layer(middleware::from_fn_with_state(
            state,
            verify_webhook_signature,
        ))
}

/// Build the complete application with all layers applied.
///
/// Sentry layers are added by the binary so tests can drive this router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes(state.clone()))
        .layer(RequestBodyLimitLayer::new(MAX_WEBHOOK_BODY))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        webhook_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check Shopify.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;
    use wiremock::MockServer;

    use super::*;
    use crate::middleware::{HMAC_HEADER, REQUEST_ID_HEADER, webhook_signature::sign};
    use crate::state::testing::test_state;

    const SECRET: &str = "4b9e1c7a2f6d0e8b3a5c9f1d7e2b6a04";
    const PREVIEW: &str = r#"{"orderId":"1001","lineItems":[]}"#;

    fn preview_request(signature: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/replace-dummy/preview")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header(HMAC_HEADER, signature);
        }
        builder.body(Body::from(PREVIEW)).unwrap()
    }

    #[tokio::test]
    async fn test_health_skips_signature_check() {
        let server = MockServer::start().await;
        let response = app(test_state(&server, Some(SECRET)))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_unsigned_request_rejected_when_secret_set() {
        let server = MockServer::start().await;
        let response = app(test_state(&server, Some(SECRET)))
            .oneshot(preview_request(None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_signature_rejected() {
        let server = MockServer::start().await;
        let signature = sign(b"some-other-secret", PREVIEW.as_bytes()).unwrap();
        let response = app(test_state(&server, Some(SECRET)))
            .oneshot(preview_request(Some(&signature)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signed_request_passes() {
        let server = MockServer::start().await;
        let signature = sign(SECRET.as_bytes(), PREVIEW.as_bytes()).unwrap();
        let response = app(test_state(&server, Some(SECRET)))
            .oneshot(preview_request(Some(&signature)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unsigned_request_allowed_without_secret() {
        let server = MockServer::start().await;
        let response = app(test_state(&server, None))
            .oneshot(preview_request(None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
