//! # Application State
//!
//! Shared state for the Axum application: the two provider clients plus
//! server configuration.

use std::sync::Arc;
use volt_affirm::AffirmClient;
use volt_card::CardClient;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Hostname allow-list for the card checkout origin. `None` accepts
    /// any parsable http(s) origin.
    pub allowed_origins: Option<Vec<String>>,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            allowed_origins: parse_origin_list(std::env::var("ALLOWED_ORIGINS").ok().as_deref()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Comma-separated hostname list; empty or unset disables the allow-list
fn parse_origin_list(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?;
    let hosts: Vec<String> = raw
        .split(',')
        .map(|h| h.trim().to_ascii_lowercase())
        .filter(|h| !h.is_empty())
        .collect();
    if hosts.is_empty() {
        None
    } else {
        Some(hosts)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Card-processor session client
    pub card: Arc<CardClient>,
    /// BNPL provider client
    pub affirm: Arc<AffirmClient>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState with clients built from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let card = CardClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize card client: {}", e))?;
        let affirm = AffirmClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Affirm client: {}", e))?;

        Ok(Self {
            card: Arc::new(card),
            affirm: Arc::new(affirm),
            config,
        })
    }

    /// Create state with explicit clients (for testing)
    pub fn with_clients(card: CardClient, affirm: AffirmClient, config: AppConfig) -> Self {
        Self {
            card: Arc::new(card),
            affirm: Arc::new(affirm),
            config,
        }
    }
}
