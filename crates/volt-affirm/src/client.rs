//! # BNPL Provider Client
//!
//! Checkout creation and authorize/capture against the Affirm API.
//!
//! The two operations share one parameterized request helper: Basic auth
//! with the private key as username and an empty password, a 15-second
//! timeout, and a structured secret-free log line per call. Validation runs
//! before any network traffic.

use crate::config::AffirmConfig;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use volt_core::{AffirmCheckout, CheckoutError, CheckoutResult, MIN_AFFIRM_TOTAL_CENTS};

/// Normalized provider response returned to the storefront
#[derive(Debug, Clone, Serialize)]
pub struct ProviderResponse {
    pub ok: bool,
    pub status: u16,
    pub data: serde_json::Value,
}

/// Authorize/capture request for a completed BNPL modal flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Opaque token handed back by the provider modal
    pub checkout_token: String,
    /// Caller-generated order identifier
    pub order_id: String,
    /// Amount in cents, must be positive
    pub amount_cents: i64,
    /// 3-letter uppercase currency code
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Capture immediately (default true)
    #[serde(default = "default_capture")]
    pub capture: bool,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_capture() -> bool {
    true
}

impl AuthorizationRequest {
    /// Order id in the storefront's `ORDER-<epoch millis>` convention
    pub fn generated_order_id() -> String {
        format!("ORDER-{}", Utc::now().timestamp_millis())
    }

    /// Field-level validation, run before any network call
    pub fn validate(&self) -> CheckoutResult<()> {
        if self.checkout_token.trim().is_empty() {
            return Err(CheckoutError::MissingField {
                field: "checkout_token",
            });
        }
        if self.order_id.trim().is_empty() {
            return Err(CheckoutError::MissingField { field: "order_id" });
        }
        if self.amount_cents <= 0 {
            return Err(CheckoutError::InvalidRequest(
                "amount_cents must be a positive integer".to_string(),
            ));
        }
        if !is_currency_code(&self.currency) {
            return Err(CheckoutError::InvalidRequest(
                "currency must be a 3-letter uppercase code".to_string(),
            ));
        }
        Ok(())
    }
}

/// Exactly three ASCII uppercase letters
fn is_currency_code(value: &str) -> bool {
    value.len() == 3 && value.chars().all(|c| c.is_ascii_uppercase())
}

/// Affirm API client
pub struct AffirmClient {
    config: AffirmConfig,
    client: Client,
}

impl AffirmClient {
    /// Create a new client from explicit config
    pub fn new(config: AffirmConfig) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CheckoutError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables (errors before any network call
    /// when the private credential is absent)
    pub fn from_env() -> CheckoutResult<Self> {
        Self::new(AffirmConfig::from_env()?)
    }

    /// Create a checkout with the provider.
    ///
    /// Rejects empty item lists, non-positive totals, totals under the $50
    /// provider minimum, and malformed currency codes without touching the
    /// network.
    #[instrument(skip(self, checkout), fields(items = checkout.items.len(), total = checkout.total))]
    pub async fn create_checkout(
        &self,
        checkout: &AffirmCheckout,
    ) -> CheckoutResult<ProviderResponse> {
        if checkout.items.is_empty() {
            return Err(CheckoutError::InvalidRequest(
                "checkout has no items".to_string(),
            ));
        }
        if checkout.total <= 0 {
            return Err(CheckoutError::InvalidRequest(
                "total must be a positive integer".to_string(),
            ));
        }
        if !checkout.meets_minimum() {
            return Err(CheckoutError::InvalidRequest(format!(
                "total below the {MIN_AFFIRM_TOTAL_CENTS}-cent minimum"
            )));
        }
        if !is_currency_code(&checkout.currency) {
            return Err(CheckoutError::InvalidRequest(
                "currency must be a 3-letter uppercase code".to_string(),
            ));
        }

        let body = serde_json::to_value(checkout)
            .map_err(|e| CheckoutError::Serialization(e.to_string()))?;
        self.send("/checkout", &body, "create_checkout").await
    }

    /// Exchange a checkout token for an authorization (and capture, by
    /// default) after the buyer completes the modal flow.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn authorize(&self, request: &AuthorizationRequest) -> CheckoutResult<ProviderResponse> {
        request.validate()?;

        debug!(
            has_checkout_token = !request.checkout_token.trim().is_empty(),
            amount_cents = request.amount_cents,
            capture = request.capture,
            "authorizing BNPL charge"
        );

        let body = serde_json::json!({
            "checkout_token": request.checkout_token.trim(),
            "order_id": request.order_id.trim(),
            "amount": request.amount_cents,
            "currency": request.currency,
            "capture": request.capture,
        });
        self.send("/charges", &body, "authorize").await
    }

    /// Shared request path for both operations: auth header, timeout,
    /// response normalization, and the structured log line.
    async fn send(
        &self,
        path: &str,
        body: &serde_json::Value,
        operation: &'static str,
    ) -> CheckoutResult<ProviderResponse> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.private_key, Some(""))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e, operation, started))?;

        let status = response.status();
        // Unparsable provider bodies normalize to an empty object
        let data: serde_json::Value = response
            .json()
            .await
            .unwrap_or_else(|_| serde_json::json!({}));
        let duration_ms = started.elapsed().as_millis() as u64;

        if !status.is_success() {
            error!(
                operation,
                status = status.as_u16(),
                duration_ms,
                "affirm call rejected"
            );
            return Err(CheckoutError::Provider {
                provider: "affirm",
                status: status.as_u16(),
                details: data,
            });
        }

        info!(
            operation,
            status = status.as_u16(),
            duration_ms,
            has_checkout_token = data.get("checkout_token").is_some(),
            "affirm call succeeded"
        );

        Ok(ProviderResponse {
            ok: true,
            status: status.as_u16(),
            data,
        })
    }

    fn transport_error(
        &self,
        err: reqwest::Error,
        operation: &'static str,
        started: Instant,
    ) -> CheckoutError {
        let duration_ms = started.elapsed().as_millis() as u64;
        if err.is_timeout() {
            error!(operation, duration_ms, "affirm call timed out");
            CheckoutError::Timeout {
                provider: "affirm",
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else {
            error!(operation, duration_ms, error = %err, "affirm call failed");
            CheckoutError::Network(err.to_string())
        }
    }
}
