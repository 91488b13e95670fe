//! # Request Handlers
//!
//! Axum request handlers for the checkout API. Each handler validates its
//! input completely before any provider traffic, then maps
//! `CheckoutError` onto the HTTP envelope via `status_code()` and
//! `public_message()`.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use volt_affirm::{AuthorizationRequest, ProviderResponse};
use volt_core::{build_card_line_items, validate_origin, AffirmCheckout, CartItem, CheckoutError};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Card checkout request
#[derive(Debug, Deserialize)]
pub struct CardCheckoutRequest {
    /// Cart contents
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Storefront origin the buyer is redirected back to
    #[serde(default)]
    pub origin: String,
}

/// Card checkout response
#[derive(Debug, Serialize)]
pub struct CardCheckoutResponse {
    /// Redirect the buyer here
    pub url: String,
}

/// BNPL checkout request
#[derive(Debug, Deserialize)]
pub struct AffirmCheckoutRequest {
    /// Checkout object assembled by the storefront
    #[serde(default)]
    pub checkout: Option<AffirmCheckout>,
}

/// Error response envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn checkout_error_to_response(err: CheckoutError) -> HandlerError {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.public_message(), code);
    if let CheckoutError::Provider { ref details, .. } = err {
        if !details.is_null() {
            response = response.with_details(details.clone());
        }
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// Malformed or missing JSON bodies get the same envelope as domain errors
fn rejection_to_response(rejection: JsonRejection) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(
            format!("Invalid request body: {}", rejection.body_text()),
            400,
        )),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "volt-checkout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a card checkout session
#[instrument(skip(state, payload))]
pub async fn card_checkout(
    State(state): State<AppState>,
    payload: Result<Json<CardCheckoutRequest>, JsonRejection>,
) -> Result<Json<CardCheckoutResponse>, HandlerError> {
    let Json(request) = payload.map_err(rejection_to_response)?;

    let origin = validate_origin(&request.origin, state.config.allowed_origins.as_deref())
        .map_err(checkout_error_to_response)?;

    if request.items.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Cart is empty", 400)),
        ));
    }

    let line_items = build_card_line_items(&request.items).map_err(checkout_error_to_response)?;

    info!(
        items = line_items.len(),
        origin = %origin,
        "Creating card checkout session"
    );

    let session = state
        .card
        .create_session(&line_items, &origin)
        .await
        .map_err(|e| {
            error!("Failed to create card session: {}", e);
            checkout_error_to_response(e)
        })?;

    info!(session_id = %session.id, "Created card checkout session");

    Ok(Json(CardCheckoutResponse { url: session.url }))
}

/// Create a BNPL checkout with the provider
#[instrument(skip(state, payload))]
pub async fn affirm_checkout(
    State(state): State<AppState>,
    payload: Result<Json<AffirmCheckoutRequest>, JsonRejection>,
) -> Result<Json<ProviderResponse>, HandlerError> {
    let Json(request) = payload.map_err(rejection_to_response)?;

    let checkout = request.checkout.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Missing checkout", 400)),
        )
    })?;

    let response = state.affirm.create_checkout(&checkout).await.map_err(|e| {
        error!("Failed to create Affirm checkout: {}", e);
        checkout_error_to_response(e)
    })?;

    Ok(Json(response))
}

/// Authorize (and by default capture) a completed BNPL checkout
#[instrument(skip(state, payload))]
pub async fn affirm_authorize(
    State(state): State<AppState>,
    payload: Result<Json<AuthorizationRequest>, JsonRejection>,
) -> Result<Json<ProviderResponse>, HandlerError> {
    let Json(request) = payload.map_err(rejection_to_response)?;

    let response = state.affirm.authorize(&request).await.map_err(|e| {
        error!("Failed to authorize Affirm charge: {}", e);
        checkout_error_to_response(e)
    })?;

    Ok(Json(response))
}
