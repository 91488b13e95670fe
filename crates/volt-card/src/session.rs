//! # Card Checkout Sessions
//!
//! Client for the card processor's hosted checkout-session API. Takes the
//! line items produced by `volt_core::build_card_line_items` plus a
//! validated origin, and returns the redirect URL for the buyer's browser.

use crate::config::CardConfig;
use reqwest::Client;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;
use volt_core::{CardLineItem, CheckoutError, CheckoutResult};

/// A created checkout session
#[derive(Debug, Clone)]
pub struct CardSession {
    /// Provider's session id
    pub id: String,
    /// Redirect target for the buyer's browser
    pub url: String,
}

/// Card checkout-session client
pub struct CardClient {
    config: CardConfig,
    client: Client,
}

impl CardClient {
    /// Create a new client from explicit config
    pub fn new(config: CardConfig) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CheckoutError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        Self::new(CardConfig::from_env()?)
    }

    /// Create a payment-mode checkout session.
    ///
    /// `origin` must already be validated (`volt_core::validate_origin`);
    /// the success and cancel redirects are derived from it, with distinct
    /// query markers and the session-id placeholder on the success side.
    #[instrument(skip(self, line_items), fields(items = line_items.len()))]
    pub async fn create_session(
        &self,
        line_items: &[CardLineItem],
        origin: &str,
    ) -> CheckoutResult<CardSession> {
        if line_items.is_empty() {
            return Err(CheckoutError::InvalidRequest("Cart is empty".to_string()));
        }

        let origin = origin.trim_end_matches('/');
        let mut form_params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            (
                "success_url".to_string(),
                format!("{origin}/?paid=1&session_id={{CHECKOUT_SESSION_ID}}"),
            ),
            ("cancel_url".to_string(), format!("{origin}/?canceled=1")),
            (
                "billing_address_collection".to_string(),
                "auto".to_string(),
            ),
            ("customer_creation".to_string(), "if_required".to_string()),
            ("metadata[source]".to_string(), "voltride".to_string()),
        ];

        for (i, item) in line_items.iter().enumerate() {
            form_params.push((
                format!("line_items[{i}][quantity]"),
                item.quantity.to_string(),
            ));
            form_params.push((
                format!("line_items[{i}][price_data][currency]"),
                "usd".to_string(),
            ));
            form_params.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            form_params.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            form_params.push((
                format!("line_items[{i}][price_data][product_data][metadata][id]"),
                item.metadata.id.clone(),
            ));
            form_params.push((
                format!("line_items[{i}][price_data][product_data][metadata][sku]"),
                item.metadata.sku.clone(),
            ));
        }

        debug!("Creating card checkout session: {} items", line_items.len());

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let idempotency_key = Uuid::new_v4().to_string();
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        let duration_ms = started.elapsed().as_millis() as u64;

        if !status.is_success() {
            error!(status = status.as_u16(), duration_ms, "card session create rejected");

            let details = serde_json::from_str::<CardErrorResponse>(&body)
                .map(|e| {
                    serde_json::json!({
                        "message": e.error.message,
                        "code": e.error.code,
                        "param": e.error.param,
                    })
                })
                .unwrap_or_else(|_| serde_json::json!({ "message": "unrecognized provider error" }));

            return Err(CheckoutError::Provider {
                provider: "stripe",
                status: status.as_u16(),
                details,
            });
        }

        let session: CardSessionResponse = serde_json::from_str(&body)
            .map_err(|e| CheckoutError::Serialization(format!("card session response: {e}")))?;

        let redirect_url = session.url.ok_or(CheckoutError::MissingSessionUrl)?;

        info!(
            session_id = %session.id,
            duration_ms,
            "created card checkout session"
        );

        Ok(CardSession {
            id: session.id,
            url: redirect_url,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> CheckoutError {
        if err.is_timeout() {
            CheckoutError::Timeout {
                provider: "stripe",
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else {
            CheckoutError::Network(err.to_string())
        }
    }
}

// =============================================================================
// Card API wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct CardSessionResponse {
    #[serde(default)]
    id: String,
    // A nominal success can still omit the url; callers treat that as a
    // server-side failure.
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CardErrorResponse {
    error: CardApiError,
}

#[derive(Debug, Deserialize)]
struct CardApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    param: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use volt_core::{build_card_line_items, CartItem};
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CardClient {
        let config = CardConfig::new("sk_test_abc", "pk_test_xyz")
            .with_api_base_url(server.uri())
            .with_timeout(Duration::from_millis(250));
        CardClient::new(config).unwrap()
    }

    fn scooter_line_items() -> Vec<CardLineItem> {
        build_card_line_items(&[CartItem::new("5", "Volt Scooter X", 1500.0, 1)]).unwrap()
    }

    #[tokio::test]
    async fn test_create_session_returns_redirect_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("Authorization", "Bearer sk_test_abc"))
            .and(body_string_contains("mode=payment"))
            .and(body_string_contains("unit_amount%5D=150000"))
            .and(body_string_contains("session_id%3D%7BCHECKOUT_SESSION_ID%7D"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_123",
                "url": "https://pay.example/cs_123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let session = client
            .create_session(&scooter_line_items(), "https://voltride.agency")
            .await
            .unwrap();

        assert_eq!(session.id, "cs_123");
        assert_eq!(session.url, "https://pay.example/cs_123");
    }

    #[tokio::test]
    async fn test_missing_url_is_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "cs_9" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_session(&scooter_line_items(), "https://voltride.agency")
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::MissingSessionUrl));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_provider_rejection_surfaces_status_and_details() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402).set_body_json(serde_json::json!({
                "error": { "message": "Your card was declined.", "code": "card_declined" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_session(&scooter_line_items(), "https://voltride.agency")
            .await
            .unwrap_err();

        match err {
            CheckoutError::Provider {
                provider, status, details,
            } => {
                assert_eq!(provider, "stripe");
                assert_eq!(status, 402);
                assert_eq!(details["code"], "card_declined");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_provider_yields_distinct_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "id": "cs_1", "url": "https://x" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_session(&scooter_line_items(), "https://voltride.agency")
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Timeout { provider: "stripe", .. }));
        assert_eq!(err.status_code(), 504);
    }

    #[tokio::test]
    async fn test_empty_line_items_rejected_before_network() {
        let server = MockServer::start().await;
        // No mock mounted: any request would 404 and fail the test assertions
        let err = client_for(&server)
            .create_session(&[], "https://voltride.agency")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidRequest(_)));
    }
}
