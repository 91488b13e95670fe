//! # Buyer Identity
//!
//! Billing/shipping identity for the BNPL flow, with the completeness
//! contract enforced before the provider is ever invoked. Incomplete data
//! is reported field-by-field so the UI can route back to a collection
//! step instead of failing the request.

use serde::{Deserialize, Serialize};

/// US postal address
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub city: String,
    /// 2-letter state code
    #[serde(default)]
    pub state: String,
    /// 5-digit ZIP, optionally ZIP+4
    #[serde(default)]
    pub zip: String,
    /// Defaults to "US" on normalization
    #[serde(default)]
    pub country: String,
}

/// Buyer identity as collected by the storefront
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Buyer {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: Address,
}

impl Buyer {
    /// Trim all free-text fields, uppercase the state, default the country
    /// to "US".
    pub fn normalized(&self) -> Buyer {
        Buyer {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            address: Address {
                line1: self.address.line1.trim().to_string(),
                city: self.address.city.trim().to_string(),
                state: self.address.state.trim().to_uppercase(),
                zip: self.address.zip.trim().to_string(),
                country: {
                    let c = self.address.country.trim().to_uppercase();
                    if c.is_empty() {
                        "US".to_string()
                    } else {
                        c
                    }
                },
            },
        }
    }

    /// Names of fields that are empty or fail their format check.
    /// An empty result means the buyer may proceed to the provider flow.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let b = self.normalized();
        let mut missing = Vec::new();

        if b.first_name.is_empty() {
            missing.push("first_name");
        }
        if b.last_name.is_empty() {
            missing.push("last_name");
        }
        if !is_email(&b.email) {
            missing.push("email");
        }
        if b.address.line1.is_empty() {
            missing.push("address.line1");
        }
        if b.address.city.is_empty() {
            missing.push("address.city");
        }
        if !is_us_state(&b.address.state) {
            missing.push("address.state");
        }
        if !is_us_zip(&b.address.zip) {
            missing.push("address.zip");
        }

        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// RFC-shaped email check: non-empty local part and domain with a dot,
/// no whitespace, exactly one '@'.
pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = match parts.next() {
        Some(d) => d,
        None => return false,
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    // Domain needs a dot with something on both sides
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Exactly two ASCII letters (case-insensitive)
pub fn is_us_state(value: &str) -> bool {
    let value = value.trim();
    value.len() == 2 && value.chars().all(|c| c.is_ascii_alphabetic())
}

/// 5 digits, optionally "-" plus 4 more
pub fn is_us_zip(value: &str) -> bool {
    let value = value.trim();
    let (head, tail) = match value.split_once('-') {
        Some((h, t)) => (h, Some(t)),
        None => (value, None),
    };
    if head.len() != 5 || !head.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    match tail {
        Some(t) => t.len() == 4 && t.chars().all(|c| c.is_ascii_digit()),
        None => true,
    }
}
