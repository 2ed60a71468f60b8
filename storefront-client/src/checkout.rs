//! Checkout payment state machine
//!
//! Selecting a payment method drives fee, verification, and the
//! bank-transfer countdown:
//!
//! - `pay_on_delivery` (default): base shipping fee, verified
//! - `pay_on_pickup`: no shipping fee, verified
//! - `bank_transfer`: base shipping fee, unverified until the transfer is
//!   confirmed; a 900-second window counts down at 1 Hz
//! - `card`: disabled, selection is rejected
//!
//! Confirming the payment freezes the countdown at its current value.

use rust_decimal::Decimal;
use shared::models::PaymentMethod;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, ClientResult};

/// Bank-transfer verification window
pub const PAYMENT_WINDOW_SECS: u64 = 900;

/// Observable snapshot of the checkout payment state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentState {
    pub method: PaymentMethod,
    /// Whether the order can be submitted as paid/acknowledged
    pub verified: bool,
    pub shipping_fee: Decimal,
    /// Seconds left in the bank-transfer window; `None` for other methods
    pub countdown_remaining: Option<u64>,
}

/// Client-side checkout session
pub struct CheckoutSession {
    base_fee: Decimal,
    state_tx: watch::Sender<PaymentState>,
    /// Cancels the running countdown task
    countdown: Mutex<Option<CancellationToken>>,
}

impl CheckoutSession {
    /// Start a session with the default method (`pay_on_delivery`)
    pub fn new(base_fee: Decimal) -> Self {
        let initial = PaymentState {
            method: PaymentMethod::PayOnDelivery,
            verified: true,
            shipping_fee: base_fee,
            countdown_remaining: None,
        };
        let (state_tx, _) = watch::channel(initial);
        Self {
            base_fee,
            state_tx,
            countdown: Mutex::new(None),
        }
    }

    /// Watch payment state changes (countdown ticks included)
    pub fn state(&self) -> watch::Receiver<PaymentState> {
        self.state_tx.subscribe()
    }

    /// Current payment state snapshot
    pub fn current(&self) -> PaymentState {
        self.state_tx.borrow().clone()
    }

    /// Whether the bank-transfer window ran out before confirmation
    pub fn expired(&self) -> bool {
        let state = self.state_tx.borrow();
        !state.verified && state.countdown_remaining == Some(0)
    }

    /// Switch payment method, resetting verification and countdown
    pub fn select_method(&self, method: PaymentMethod) -> ClientResult<()> {
        if !method.is_enabled() {
            return Err(ClientError::Validation(format!(
                "{method} payments are currently unavailable"
            )));
        }

        self.stop_countdown();

        let state = PaymentState {
            method,
            verified: !method.requires_verification(),
            shipping_fee: method.shipping_fee(self.base_fee),
            countdown_remaining: method
                .requires_verification()
                .then_some(PAYMENT_WINDOW_SECS),
        };
        // send_replace, not send: the update must land even with no watcher
        self.state_tx.send_replace(state);

        if method.requires_verification() {
            self.start_countdown();
        }
        Ok(())
    }

    /// Mark the transfer as confirmed; the countdown freezes where it is
    pub fn confirm_payment(&self) {
        self.stop_countdown();
        self.state_tx.send_modify(|state| {
            state.verified = true;
        });
    }

    fn start_countdown(&self) {
        let token = CancellationToken::new();
        *self.countdown.lock().expect("countdown lock poisoned") = Some(token.clone());

        let state_tx = self.state_tx.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(1));
            tick.tick().await; // skip immediate tick
            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tick.tick() => {
                        let mut done = false;
                        state_tx.send_modify(|state| {
                            if let Some(remaining) = state.countdown_remaining.as_mut() {
                                *remaining = remaining.saturating_sub(1);
                                done = *remaining == 0;
                            }
                        });
                        if done {
                            tracing::info!("Bank transfer window expired");
                            return;
                        }
                    }
                }
            }
        });
    }

    fn stop_countdown(&self) {
        if let Some(token) = self
            .countdown
            .lock()
            .expect("countdown lock poisoned")
            .take()
        {
            token.cancel();
        }
    }
}

impl Drop for CheckoutSession {
    fn drop(&mut self) {
        self.stop_countdown();
    }
}
