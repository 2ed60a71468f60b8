//! Email receipt seam
//!
//! Actual delivery is an external collaborator (email service); the server
//! only owns the trigger point after successful order creation. The default
//! implementation logs the receipt instead of sending it.

use async_trait::async_trait;
use shared::error::AppResult;
use shared::models::Order;

#[async_trait]
pub trait ReceiptSender: Send + Sync {
    /// Deliver an order receipt to the shipping email
    async fn send(&self, order: &Order, site_url: &str) -> AppResult<()>;
}

/// Logs the receipt instead of sending it
#[derive(Debug, Default)]
pub struct LogReceiptSender;

#[async_trait]
impl ReceiptSender for LogReceiptSender {
    async fn send(&self, order: &Order, site_url: &str) -> AppResult<()> {
        tracing::info!(
            order_id = %order.id,
            email = %order.shipping.email,
            total = %order.total,
            order_url = format!("{}/orders/{}", site_url, order.id),
            "Receipt ready for delivery"
        );
        Ok(())
    }
}
