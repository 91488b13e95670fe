//! # Checkout Error Types
//!
//! Typed error handling for the voltride checkout engine.
//! All checkout operations return `Result<T, CheckoutError>`.

use thiserror::Error;

/// Core error type for all checkout operations
#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A required field is missing or empty
    #[error("Missing {field}")]
    MissingField { field: &'static str },

    /// Price is non-finite, non-positive, or rounds to a non-positive amount
    #[error("Invalid price: {message}")]
    InvalidPrice { message: String },

    /// Origin is not a parsable http(s) URL with a hostname
    #[error("Invalid origin: {0}")]
    InvalidOrigin(String),

    /// Origin parsed but is not on the configured allow-list
    #[error("Origin not allowed: {0}")]
    OriginNotAllowed(String),

    /// Payment provider rejected the request (non-2xx)
    #[error("Provider error [{provider}]: status {status}")]
    Provider {
        provider: &'static str,
        status: u16,
        details: serde_json::Value,
    },

    /// Provider call exceeded its timeout bound
    #[error("Request to {provider} timed out after {timeout_secs}s")]
    Timeout {
        provider: &'static str,
        timeout_secs: u64,
    },

    /// Network/transport error communicating with provider
    #[error("Network error: {0}")]
    Network(String),

    /// Provider returned a nominal success without a redirect URL
    #[error("Checkout session missing url")]
    MissingSessionUrl,

    /// Cart persistence failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CheckoutError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::Configuration(_) => 500,
            CheckoutError::InvalidRequest(_) => 400,
            CheckoutError::MissingField { .. } => 400,
            CheckoutError::InvalidPrice { .. } => 400,
            CheckoutError::InvalidOrigin(_) => 400,
            CheckoutError::OriginNotAllowed(_) => 403,
            // Mirror the provider status where it is a sensible client-facing
            // code; anything outside 400..=599 collapses to 502.
            CheckoutError::Provider { status, .. } => {
                if (400..=599).contains(status) {
                    *status
                } else {
                    502
                }
            }
            CheckoutError::Timeout { .. } => 504,
            CheckoutError::Network(_) => 500,
            CheckoutError::MissingSessionUrl => 500,
            CheckoutError::Storage(_) => 500,
            CheckoutError::Serialization(_) => 500,
        }
    }

    /// Returns true if this error is retryable by the caller
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::Network(_)
                | CheckoutError::Timeout { .. }
                | CheckoutError::Provider { .. }
        )
    }

    /// Message safe to show a buyer. Configuration and transport errors
    /// keep their detail in server logs only.
    pub fn public_message(&self) -> String {
        match self {
            CheckoutError::Configuration(_) => "Server configuration error".to_string(),
            CheckoutError::Network(_) => "Failed to reach payment provider".to_string(),
            CheckoutError::Serialization(_) => "Failed to create checkout session".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CheckoutError::InvalidRequest("test".into()).status_code(),
            400
        );
        assert_eq!(
            CheckoutError::OriginNotAllowed("evil.example".into()).status_code(),
            403
        );
        assert_eq!(
            CheckoutError::Timeout {
                provider: "affirm",
                timeout_secs: 15
            }
            .status_code(),
            504
        );
        assert_eq!(CheckoutError::MissingSessionUrl.status_code(), 500);
    }

    #[test]
    fn test_provider_status_mirrored() {
        let err = CheckoutError::Provider {
            provider: "affirm",
            status: 422,
            details: serde_json::json!({"field": "items"}),
        };
        assert_eq!(err.status_code(), 422);

        // Nonsense provider statuses collapse to 502
        let err = CheckoutError::Provider {
            provider: "affirm",
            status: 302,
            details: serde_json::Value::Null,
        };
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(CheckoutError::Network("reset".into()).is_retryable());
        assert!(CheckoutError::Timeout {
            provider: "stripe",
            timeout_secs: 20
        }
        .is_retryable());
        assert!(!CheckoutError::InvalidPrice {
            message: "bad".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_public_message_hides_config_detail() {
        let err = CheckoutError::Configuration("STRIPE_SECRET_KEY not set".into());
        assert!(!err.public_message().contains("STRIPE_SECRET_KEY"));
    }
}
