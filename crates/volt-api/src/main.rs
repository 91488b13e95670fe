//! # Volt Checkout
//!
//! Checkout API for the voltride electric-mobility storefront.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//! export AFFIRM_PRIVATE_KEY=...
//!
//! # Run the server
//! volt-checkout
//! ```

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use volt_api::{routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    match &state.config.allowed_origins {
        Some(hosts) => info!("Allowed origins: {:?}", hosts),
        None => info!("Allowed origins: any http(s) origin"),
    }

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("⚡ Volt Checkout starting on http://{}", addr);

    if !is_prod {
        info!("💳 Card checkout: POST http://{}/api/card-checkout", addr);
        info!("🛒 BNPL checkout: POST http://{}/api/affirm-checkout", addr);
        info!("✅ Authorize: POST http://{}/api/affirm-authorize", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  ⚡ Volt Checkout ⚡
  ━━━━━━━━━━━━━━━━━━━
  Storefront checkout engine
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
