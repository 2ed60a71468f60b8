//! Server configuration, env-var driven with localhost defaults

use rust_decimal::Decimal;
use std::time::Duration;

/// Storefront server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// Inventory webhook receiver; None disables the webhook channel
    pub inventory_webhook_url: Option<String>,
    /// Shared secret for webhook HMAC signatures
    pub webhook_secret: String,
    /// Per-request webhook timeout
    pub webhook_timeout: Duration,
    /// Advertised WebSocket endpoint for realtime order updates
    pub websocket_url: String,
    /// Public site base URL (used in receipts and share links)
    pub site_url: String,
    /// Shipping fee applied to delivery orders
    pub base_shipping_fee: Decimal,
    pub jwt_secret: String,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4000),
            inventory_webhook_url: std::env::var("INVENTORY_WEBHOOK_URL")
                .ok()
                .filter(|u| !u.is_empty()),
            webhook_secret: std::env::var("WEBHOOK_SECRET")
                .unwrap_or_else(|_| "dev-webhook-secret".into()),
            webhook_timeout: Duration::from_secs(10),
            websocket_url: std::env::var("WEBSOCKET_URL")
                .unwrap_or_else(|_| "ws://localhost:4000/ws".into()),
            site_url: std::env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            base_shipping_fee: std::env::var("BASE_SHIPPING_FEE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| Decimal::from(3500)),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev-jwt-secret".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
