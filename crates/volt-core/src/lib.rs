//! # volt-core
//!
//! Core types and pure logic for the voltride checkout engine.
//!
//! This crate provides:
//! - `CartItem` and `CartStore` over a pluggable `KvStore`
//! - `build_card_line_items` for the card-processor session request
//! - `build_affirm_checkout` for the BNPL checkout object
//! - `Buyer` identity with the BNPL completeness contract
//! - `validate_origin` for redirect-URL safety
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use volt_core::{CartItem, CartStore, MemoryStore, build_card_line_items};
//!
//! let mut cart = CartStore::load(MemoryStore::new());
//! cart.add_item(CartItem::new("5", "Volt Scooter X", 1500.0, 1))?;
//!
//! // Pure transformation, no network I/O
//! let line_items = build_card_line_items(cart.items())?;
//! ```

pub mod buyer;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod origin;

// Re-exports for convenience
pub use buyer::{Address, Buyer};
pub use cart::{clamp_qty, CartItem, CartStore, KvStore, MemoryStore, CART_STORAGE_KEY};
pub use checkout::{
    build_affirm_checkout, build_card_line_items, to_cents, AffirmCheckout, AffirmContact,
    AffirmItem, AffirmMerchant, CardItemMetadata, CardLineItem, Totals, MAX_CARD_QTY,
    MIN_AFFIRM_TOTAL_CENTS,
};
pub use error::{CheckoutError, CheckoutResult};
pub use origin::validate_origin;
