//! # Checkout Request Builders
//!
//! Pure transformations from cart state + buyer identity into
//! provider-specific payloads. No network I/O here; the card and BNPL
//! clients take these payloads to the wire.

use crate::buyer::Buyer;
use crate::cart::CartItem;
use crate::error::{CheckoutError, CheckoutResult};
use serde::{Deserialize, Serialize};
use url::Url;

/// Minimum BNPL order total (cents) before the provider flow may start
pub const MIN_AFFIRM_TOTAL_CENTS: i64 = 5000;

/// Card processors cap per-line quantity at 50
pub const MAX_CARD_QTY: i64 = 50;

/// Display-name cap for card line items
pub const CARD_NAME_MAX: usize = 250;

/// Display-name cap for BNPL items
pub const AFFIRM_NAME_MAX: usize = 120;

/// Convert a USD amount to integer cents. Non-finite input maps to 0.
pub fn to_cents(usd: f64) -> i64 {
    if !usd.is_finite() {
        return 0;
    }
    (usd * 100.0).round() as i64
}

/// Collapse internal whitespace and cap length; empty input falls back
/// to the given default.
fn sanitize_name(raw: &str, max: usize, fallback: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return fallback.to_string();
    }
    collapsed.chars().take(max).collect()
}

// =============================================================================
// Card variant
// =============================================================================

/// Per-item metadata carried for provider-side reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardItemMetadata {
    pub id: String,
    pub sku: String,
}

/// One line item of a card checkout-session request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardLineItem {
    /// Quantity clamped to [1, 50]
    pub quantity: i64,
    /// Unit amount in integer cents, always positive
    pub unit_amount: i64,
    /// Sanitized display name
    pub name: String,
    pub metadata: CardItemMetadata,
}

/// Map cart items to card line items.
///
/// Any item with a non-finite or non-positive price, or whose rounded
/// cent amount is not a positive integer, rejects the whole batch: no
/// partial provider call is ever made.
pub fn build_card_line_items(items: &[CartItem]) -> CheckoutResult<Vec<CardLineItem>> {
    items
        .iter()
        .map(|item| {
            if !item.price.is_finite() || item.price <= 0.0 {
                return Err(CheckoutError::InvalidPrice {
                    message: format!("item {}: price must be a positive number", item.id),
                });
            }

            let unit_amount = to_cents(item.price);
            if unit_amount <= 0 {
                return Err(CheckoutError::InvalidPrice {
                    message: format!("item {}: amount rounds to zero cents", item.id),
                });
            }

            Ok(CardLineItem {
                quantity: (item.qty as i64).clamp(1, MAX_CARD_QTY),
                unit_amount,
                name: sanitize_name(&item.name, CARD_NAME_MAX, "Item"),
                metadata: CardItemMetadata {
                    id: item.id.clone(),
                    sku: item.sku.clone().unwrap_or_default(),
                },
            })
        })
        .collect()
}

// =============================================================================
// BNPL variant
// =============================================================================

/// One item of a BNPL checkout object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffirmItem {
    pub display_name: String,
    pub sku: String,
    /// Unit price in cents, clamped to >= 0
    pub unit_price: i64,
    pub qty: i64,
    /// Absolute product URL
    pub item_url: String,
    /// Absolute image URL, when the cart item carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffirmMerchant {
    pub user_confirmation_url: String,
    pub user_cancel_url: String,
    pub user_confirmation_url_action: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AffirmPersonName {
    pub first: String,
    pub last: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AffirmAddress {
    pub line1: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AffirmContact {
    pub name: AffirmPersonName,
    pub address: AffirmAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AffirmMetadata {
    #[serde(default)]
    pub mode: String,
}

/// The full BNPL checkout object sent to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffirmCheckout {
    pub merchant: AffirmMerchant,
    pub items: Vec<AffirmItem>,
    pub currency: String,
    pub shipping_amount: i64,
    pub tax_amount: i64,
    pub total: i64,
    #[serde(default)]
    pub metadata: AffirmMetadata,
    pub billing: AffirmContact,
    pub shipping: AffirmContact,
}

impl AffirmCheckout {
    /// Whether the order total clears the provider minimum ($50)
    pub fn meets_minimum(&self) -> bool {
        self.total >= MIN_AFFIRM_TOTAL_CENTS
    }
}

/// Shipping and tax supplied by the storefront. The subtotal is always
/// recomputed from mapped items, never trusted from the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Totals {
    pub shipping_usd: f64,
    pub tax_usd: f64,
}

/// Resolve a possibly-relative value against the merchant base, degrading
/// to the fallback path on empty or unparsable input. Never errors.
fn to_absolute_url(base: &Url, value: Option<&str>, fallback_path: &str) -> String {
    let raw = value.unwrap_or_default().trim();
    let target = if raw.is_empty() { fallback_path } else { raw };
    base.join(target)
        .or_else(|_| base.join(fallback_path))
        .map(|u| u.to_string())
        // Root join cannot fail on an http(s) base
        .unwrap_or_else(|_| base.to_string())
}

/// Build the BNPL checkout object from cart state, totals, and a
/// normalized buyer identity.
///
/// The only failure is an unparsable merchant base origin; bad item or
/// image URLs degrade to the base root path instead of erroring.
pub fn build_affirm_checkout(
    items: &[CartItem],
    totals: &Totals,
    buyer: &Buyer,
    merchant_base: &str,
    merchant_name: &str,
) -> CheckoutResult<AffirmCheckout> {
    let base_raw = merchant_base.trim().trim_end_matches('/');
    let base = Url::parse(base_raw)
        .map_err(|_| CheckoutError::InvalidRequest(format!("invalid merchant base: {base_raw}")))?;

    let mapped: Vec<AffirmItem> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let fallback_name = format!("Item {}", idx + 1);
            AffirmItem {
                display_name: sanitize_name(&item.name, AFFIRM_NAME_MAX, &fallback_name),
                sku: item.sku.clone().unwrap_or_else(|| item.id.clone()),
                unit_price: to_cents(item.price).max(0),
                qty: (item.qty as i64).max(1),
                item_url: to_absolute_url(&base, item.url.as_deref(), "/"),
                image_url: item
                    .image
                    .as_deref()
                    .map(|img| to_absolute_url(&base, Some(img), "/")),
            }
        })
        .collect();

    let shipping_amount = to_cents(totals.shipping_usd).max(0);
    let tax_amount = to_cents(totals.tax_usd).max(0);

    // Subtotal from the already-normalized items so it always agrees with
    // unit_price * qty.
    let subtotal: i64 = mapped.iter().map(|it| it.unit_price * it.qty).sum();
    let total = subtotal + shipping_amount + tax_amount;

    let buyer = buyer.normalized();
    let name = AffirmPersonName {
        first: buyer.first_name,
        last: buyer.last_name,
    };
    let address = AffirmAddress {
        line1: buyer.address.line1,
        city: buyer.address.city,
        state: buyer.address.state,
        zipcode: buyer.address.zip,
        country: buyer.address.country,
    };

    Ok(AffirmCheckout {
        merchant: AffirmMerchant {
            user_confirmation_url: to_absolute_url(&base, Some("/checkout/affirm/confirm"), "/"),
            user_cancel_url: to_absolute_url(&base, Some("/checkout/affirm/cancel"), "/"),
            user_confirmation_url_action: "GET".to_string(),
            name: merchant_name.to_string(),
        },
        items: mapped,
        currency: "USD".to_string(),
        shipping_amount,
        tax_amount,
        total,
        metadata: AffirmMetadata {
            mode: "modal".to_string(),
        },
        billing: AffirmContact {
            name: name.clone(),
            address: address.clone(),
            email: Some(buyer.email),
        },
        shipping: AffirmContact {
            name,
            address,
            email: None,
        },
    })
}
