//! Storefront Client - checkout flow and realtime order updates
//!
//! # Components
//!
//! - **Checkout** (`checkout`): payment-method state machine with the
//!   bank-transfer verification countdown
//! - **Order flow** (`order_flow`): cart assembly and order submission
//! - **Realtime** (`realtime`): WebSocket client with reconnection and an
//!   observable connection state
//! - **Pending payments** (`pending`): background poller for bank-transfer
//!   confirmation

pub mod checkout;
pub mod config;
pub mod error;
pub mod order_flow;
pub mod pending;
pub mod realtime;

pub use checkout::{CheckoutSession, PAYMENT_WINDOW_SECS, PaymentState};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use order_flow::OrderFlow;
pub use pending::{PaymentOutcome, PendingPaymentWatcher};
pub use realtime::{ConnectionState, RealtimeClient};
