//! # Card Processor Configuration
//!
//! Configuration for the card-processor (Stripe) integration.
//! All secrets are loaded from environment variables.

use std::env;
use std::time::Duration;
use volt_core::CheckoutError;

/// Default bound on checkout-session initiation
pub const CARD_TIMEOUT_SECS: u64 = 20;

/// Card API configuration
#[derive(Debug, Clone)]
pub struct CardConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// Publishable key for the browser SDK (pk_test_... or pk_live_...)
    pub publishable_key: String,

    /// API base URL (overridable for testing/mocking)
    pub api_base_url: String,

    /// API version header
    pub api_version: String,

    /// Outbound call timeout
    pub timeout: Duration,
}

impl CardConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    /// - `STRIPE_PUBLISHABLE_KEY`
    pub fn from_env() -> Result<Self, CheckoutError> {
        dotenvy::dotenv().ok();

        let secret_key = env::var("STRIPE_SECRET_KEY")
            .map_err(|_| CheckoutError::Configuration("STRIPE_SECRET_KEY not set".to_string()))?;

        let publishable_key = env::var("STRIPE_PUBLISHABLE_KEY").map_err(|_| {
            CheckoutError::Configuration("STRIPE_PUBLISHABLE_KEY not set".to_string())
        })?;

        if !secret_key.starts_with("sk_test_") && !secret_key.starts_with("sk_live_") {
            return Err(CheckoutError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }

        if !publishable_key.starts_with("pk_test_") && !publishable_key.starts_with("pk_live_") {
            return Err(CheckoutError::Configuration(
                "STRIPE_PUBLISHABLE_KEY must start with pk_test_ or pk_live_".to_string(),
            ));
        }

        Ok(Self {
            secret_key,
            publishable_key,
            api_base_url: "https://api.stripe.com".to_string(),
            api_version: "2024-06-20".to_string(),
            timeout: Duration::from_secs(CARD_TIMEOUT_SECS),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(secret_key: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: publishable_key.into(),
            api_base_url: "https://api.stripe.com".to_string(),
            api_version: "2024-06-20".to_string(),
            timeout: Duration::from_secs(CARD_TIMEOUT_SECS),
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set custom timeout (for testing)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
