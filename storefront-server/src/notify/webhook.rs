//! Webhook signer and sender
//!
//! Pushes order events to the inventory system. The payload is serialized
//! once and the HMAC is computed over those exact bytes - the receiver must
//! verify against a byte-identical serialization, so the signed buffer is
//! also the request body.

use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use sha2::Sha256;
use shared::error::{AppError, AppResult};
use shared::notify::NotificationEvent;
use shared::retry::RetryPolicy;
use std::time::Duration;

use super::dispatcher::ChannelOutcome;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payload signature
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

/// User-Agent sent on webhook requests
const USER_AGENT: &str = "StoreFront-Webhook/1.0";

/// Sign payload bytes, producing a `sha256=<hex>` header value
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    // new_from_slice only fails on zero-length keys for some MACs; HMAC
    // accepts any key length
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| HmacSha256::new_from_slice(b"-").expect("HMAC accepts any key"));
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify a `sha256=<hex>` signature over payload bytes
///
/// Uses `Mac::verify_slice` for constant-time comparison.
pub fn verify_signature(secret: &str, payload: &[u8], signature_header: &str) -> bool {
    let Some(expected_hex) = signature_header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(sig_bytes) = hex::decode(expected_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&sig_bytes).is_ok()
}

/// Signed webhook delivery with bounded exponential retry
#[derive(Debug, Clone)]
pub struct WebhookSender {
    http: reqwest::Client,
    url: String,
    secret: String,
    timeout: Duration,
    policy: RetryPolicy,
}

impl WebhookSender {
    pub fn new(url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            secret: secret.into(),
            timeout: Duration::from_secs(10),
            policy: RetryPolicy::webhook(),
        }
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// One signed POST; non-2xx is failure, errors are returned upward
    pub async fn send_once(&self, event: &NotificationEvent) -> AppResult<()> {
        let payload = serde_json::to_vec(event)
            .map_err(|e| AppError::internal(format!("failed to serialize webhook payload: {e}")))?;
        let signature = sign_payload(&self.secret, &payload);

        // The per-request timeout doubles as the cancellation signal: on
        // expiry reqwest drops the in-flight connection, and the attempt is
        // reported as a plain failure eligible for the next retry slot.
        let response = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .header(http::header::CONTENT_TYPE, "application/json")
            .header(http::header::USER_AGENT, USER_AGENT)
            .header(SIGNATURE_HEADER, signature)
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::timeout(format!("webhook request timed out: {e}"))
                } else {
                    AppError::network(format!("webhook request failed: {e}"))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AppError::network(format!(
                "webhook receiver returned {}",
                status_label(status)
            )))
        }
    }

    /// Drive [`send_once`](Self::send_once) through the retry policy
    pub async fn send(&self, event: &NotificationEvent) -> ChannelOutcome {
        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result = self
            .policy
            .run(|_attempt| {
                attempts.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                self.send_once(event)
            })
            .await;
        match result {
            Ok(()) => ChannelOutcome::Delivered {
                attempts: attempts.load(std::sync::atomic::Ordering::Relaxed),
            },
            Err(exhausted) => {
                tracing::warn!(
                    url = %self.url,
                    attempts = exhausted.attempts,
                    error = %exhausted.error,
                    "Webhook delivery failed after all attempts"
                );
                ChannelOutcome::Failed {
                    attempts: exhausted.attempts,
                    error: exhausted.error.message,
                }
            }
        }
    }
}

fn status_label(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let payload = br#"{"event":"new_order","timestamp":1700000000000,"data":{}}"#;
        let sig = sign_payload("secret-key", payload);
        assert!(sig.starts_with("sha256="));
        assert!(verify_signature("secret-key", payload, &sig));
    }

    #[test]
    fn test_single_byte_change_fails_verification() {
        let payload = b"{\"event\":\"new_order\"}".to_vec();
        let sig = sign_payload("secret-key", &payload);

        let mut tampered = payload.clone();
        tampered[3] ^= 0x01;
        assert!(!verify_signature("secret-key", &tampered, &sig));
    }

    #[test]
    fn test_wrong_secret_fails_verification() {
        let payload = b"payload";
        let sig = sign_payload("secret-a", payload);
        assert!(!verify_signature("secret-b", payload, &sig));
    }

    #[test]
    fn test_malformed_signature_header_rejected() {
        let payload = b"payload";
        assert!(!verify_signature("secret", payload, "md5=abcdef"));
        assert!(!verify_signature("secret", payload, "sha256=not-hex"));
        assert!(!verify_signature("secret", payload, ""));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let payload = b"same bytes";
        assert_eq!(
            sign_payload("secret", payload),
            sign_payload("secret", payload)
        );
    }
}
