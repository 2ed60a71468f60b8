//! Background poller for pending bank-transfer payments
//!
//! While a bank-transfer order sits unconfirmed, the client polls the
//! payment-status endpoint every 30 seconds. The poll ends when the server
//! reports the payment confirmed, when the local verification window runs
//! out, or when the caller cancels.

use shared::request::PaymentStatusResponse;
use shared::response::ApiResponse;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::checkout::CheckoutSession;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::order_flow::into_data;

pub const POLL_INTERVAL_SECS: u64 = 30;

/// How a pending payment resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The server saw the transfer; the order moved past `pending`
    Confirmed { order_id: String },
    /// The verification window ran out; the shopper is sent back to checkout
    Expired,
    /// The caller cancelled the watch
    Cancelled,
}

/// Polls payment status for one payment reference
pub struct PendingPaymentWatcher {
    http: reqwest::Client,
    config: ClientConfig,
    reference: String,
}

impl PendingPaymentWatcher {
    pub fn new(config: ClientConfig, reference: impl Into<String>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            reference: reference.into(),
        })
    }

    /// One status request
    pub async fn poll_once(&self) -> ClientResult<PaymentStatusResponse> {
        let url = format!("{}/api/orders/payment-status", self.config.api_base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("reference", self.reference.as_str())])
            .send()
            .await?;
        let envelope: ApiResponse<PaymentStatusResponse> = response.json().await?;
        into_data(envelope)
    }

    /// Poll until the payment resolves.
    ///
    /// A failed poll is logged and retried on the next interval - transient
    /// network trouble must not end the watch.
    pub async fn watch(
        &self,
        session: &CheckoutSession,
        cancel: CancellationToken,
    ) -> PaymentOutcome {
        let mut interval = tokio::time::interval(Duration::from_secs(POLL_INTERVAL_SECS));

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return PaymentOutcome::Cancelled,
                _ = interval.tick() => {
                    if session.expired() {
                        tracing::info!(reference = %self.reference, "Payment window expired");
                        return PaymentOutcome::Expired;
                    }
                    match self.poll_once().await {
                        Ok(status) if status.confirmed => {
                            tracing::info!(
                                reference = %self.reference,
                                order_id = %status.order_id,
                                "Payment confirmed"
                            );
                            return PaymentOutcome::Confirmed {
                                order_id: status.order_id,
                            };
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!(reference = %self.reference, error = %e, "Payment status poll failed");
                        }
                    }
                }
            }
        }
    }
}
