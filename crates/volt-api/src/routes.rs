//! # Routes
//!
//! Axum router for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - POST /api/card-checkout - Create a card checkout session
/// - POST /api/affirm-checkout - Create a BNPL checkout
/// - POST /api/affirm-authorize - Authorize a completed BNPL checkout
/// - GET  /health - Health check
pub fn create_router(state: AppState) -> Router {
    // Origin enforcement for card checkout happens in the handler against
    // the configured allow-list; CORS itself stays permissive.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/card-checkout", post(handlers::card_checkout))
        .route("/affirm-checkout", post(handlers::affirm_checkout))
        .route("/affirm-authorize", post(handlers::affirm_authorize));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
