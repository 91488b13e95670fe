//! # BNPL Provider Configuration
//!
//! Configuration for the Affirm integration. The private key stays
//! server-side; the public key only ever feeds the browser SDK loader.

use std::env;
use std::time::Duration;
use volt_core::CheckoutError;

/// Bound on outbound provider calls
pub const AFFIRM_TIMEOUT_SECS: u64 = 15;

/// Which Affirm stack the storefront talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AffirmEnvironment {
    #[default]
    Prod,
    Sandbox,
}

impl AffirmEnvironment {
    /// Parse the AFFIRM_ENV selector; anything but "sandbox" means prod.
    pub fn from_selector(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("sandbox") {
            AffirmEnvironment::Sandbox
        } else {
            AffirmEnvironment::Prod
        }
    }

    /// CDN URL of the browser SDK for this environment
    pub fn script_url(&self) -> &'static str {
        match self {
            AffirmEnvironment::Prod => "https://cdn1.affirm.com/js/v2/affirm.js",
            AffirmEnvironment::Sandbox => "https://cdn1-sandbox.affirm.com/js/v2/affirm.js",
        }
    }
}

/// Affirm API configuration
#[derive(Debug, Clone)]
pub struct AffirmConfig {
    /// Private API key, used as the Basic-auth username (empty password)
    pub private_key: String,

    /// Public key for the browser SDK (optional; absence disables the
    /// BNPL button client-side)
    pub public_key: Option<String>,

    /// API base URL, trailing slashes trimmed
    pub api_base_url: String,

    /// prod or sandbox
    pub environment: AffirmEnvironment,

    /// Outbound call timeout
    pub timeout: Duration,
}

impl AffirmConfig {
    /// Load configuration from environment variables.
    ///
    /// `AFFIRM_PRIVATE_KEY` is required (legacy fallback:
    /// `AFFIRM_PRIVATE_API_KEY`). `AFFIRM_BASE_URL`, `AFFIRM_PUBLIC_KEY`,
    /// and `AFFIRM_ENV` are optional.
    pub fn from_env() -> Result<Self, CheckoutError> {
        dotenvy::dotenv().ok();

        let private_key = env::var("AFFIRM_PRIVATE_KEY")
            .or_else(|_| env::var("AFFIRM_PRIVATE_API_KEY"))
            .map_err(|_| CheckoutError::Configuration("AFFIRM_PRIVATE_KEY not set".to_string()))?;

        if private_key.trim().is_empty() {
            return Err(CheckoutError::Configuration(
                "AFFIRM_PRIVATE_KEY is empty".to_string(),
            ));
        }

        let api_base_url = env::var("AFFIRM_BASE_URL")
            .unwrap_or_else(|_| "https://api.affirm.com/api/v2".to_string());

        let environment = AffirmEnvironment::from_selector(
            &env::var("AFFIRM_ENV").unwrap_or_else(|_| "prod".to_string()),
        );

        Ok(Self {
            private_key: private_key.trim().to_string(),
            public_key: env::var("AFFIRM_PUBLIC_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            api_base_url: normalize_base_url(&api_base_url),
            environment,
            timeout: Duration::from_secs(AFFIRM_TIMEOUT_SECS),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(private_key: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        Self {
            private_key: private_key.into(),
            public_key: None,
            api_base_url: normalize_base_url(&api_base_url.into()),
            environment: AffirmEnvironment::default(),
            timeout: Duration::from_secs(AFFIRM_TIMEOUT_SECS),
        }
    }

    /// Builder: set custom timeout (for testing)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder: set the browser SDK public key
    pub fn with_public_key(mut self, key: impl Into<String>) -> Self {
        self.public_key = Some(key.into());
        self
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
