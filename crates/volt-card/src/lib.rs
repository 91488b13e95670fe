//! # volt-card
//!
//! Card-processor integration for the voltride storefront.
//!
//! Wraps the processor's hosted checkout-sessions API: line items built by
//! `volt-core` go in, a buyer redirect URL comes out. Provider rejections,
//! transport failures, and timeouts map onto `volt_core::CheckoutError`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use volt_card::CardClient;
//! use volt_core::{build_card_line_items, validate_origin};
//!
//! let client = CardClient::from_env()?;
//! let origin = validate_origin("https://voltride.agency", None)?;
//! let line_items = build_card_line_items(cart.items())?;
//!
//! let session = client.create_session(&line_items, &origin).await?;
//! // Redirect the buyer to session.url
//! ```

pub mod config;
pub mod session;

// Re-exports
pub use config::{CardConfig, CARD_TIMEOUT_SECS};
pub use session::{CardClient, CardSession};
