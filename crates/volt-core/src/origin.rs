//! # Origin Validation
//!
//! The card flow builds redirect URLs from a caller-supplied origin, so the
//! origin must be a real http(s) URL with a hostname. A forged origin would
//! otherwise turn the session endpoint into an open redirect. An optional
//! hostname allow-list tightens this further.

use crate::error::{CheckoutError, CheckoutResult};
use url::Url;

/// Validate a caller-supplied origin and return it in canonical
/// `scheme://host[:port]` form (no trailing slash).
pub fn validate_origin(origin: &str, allowed_hosts: Option<&[String]>) -> CheckoutResult<String> {
    let origin = origin.trim();
    if origin.is_empty() {
        return Err(CheckoutError::MissingField { field: "origin" });
    }

    let url = Url::parse(origin).map_err(|_| CheckoutError::InvalidOrigin(origin.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CheckoutError::InvalidOrigin(origin.to_string()));
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| CheckoutError::InvalidOrigin(origin.to_string()))?;

    if let Some(allowed) = allowed_hosts {
        if !allowed.is_empty() && !allowed.iter().any(|a| a.eq_ignore_ascii_case(host)) {
            return Err(CheckoutError::OriginNotAllowed(host.to_string()));
        }
    }

    Ok(url.origin().ascii_serialization())
}
