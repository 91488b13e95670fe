//! # volt-affirm
//!
//! BNPL (buy now, pay later) integration for the voltride storefront.
//!
//! Two halves:
//! - [`AffirmClient`] talks to the provider's REST API server-side:
//!   checkout-session creation and charge authorization, authenticated
//!   with the private key over Basic auth.
//! - [`SdkLoader`] models the browser-side script lifecycle: load the
//!   provider SDK at most once per configuration, wait for its API
//!   surface with a bounded poll, and reload when the key or environment
//!   changes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use volt_affirm::{AffirmClient, AuthorizationRequest};
//!
//! let client = AffirmClient::from_env()?;
//! let response = client.create_checkout(&checkout).await?;
//! // response.data carries the provider payload, checkout_token included
//! ```

pub mod client;
pub mod config;
pub mod loader;

// Re-exports
pub use client::{AffirmClient, AuthorizationRequest, ProviderResponse};
pub use config::{AffirmConfig, AffirmEnvironment, AFFIRM_TIMEOUT_SECS};
pub use loader::{
    LoaderError, LoaderPhase, ScriptHost, ScriptStatus, SdkLoader, SDK_POLL_INTERVAL,
    SDK_READY_TIMEOUT,
};
