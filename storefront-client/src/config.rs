//! Client configuration

use rust_decimal::Decimal;
use std::time::Duration;

/// Storefront client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the storefront API
    pub api_base_url: String,
    /// WebSocket endpoint for realtime order updates
    pub ws_url: String,
    /// Shipping fee shown before the server quotes the real total
    pub base_shipping_fee: Decimal,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// WebSocket connect timeout; a hung attempt counts as a failure
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:4000".to_string(),
            ws_url: "ws://localhost:4000/ws".to_string(),
            base_shipping_fee: Decimal::from(3500),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Point the client at a different server (tests use this)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }

    pub fn with_ws_url(mut self, ws_url: impl Into<String>) -> Self {
        self.ws_url = ws_url.into();
        self
    }
}
