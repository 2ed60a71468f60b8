//! Shared types for the storefront platform
//!
//! Common types used across the server and client crates: order models,
//! notification events, the realtime wire protocol, error types, and the
//! retry policy shared by the webhook sender and the realtime client.

pub mod error;
pub mod models;
pub mod notify;
pub mod request;
pub mod response;
pub mod retry;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

// Convenient access to the most common types
pub use models::{LineItem, Order, OrderStatus, PaymentMethod, ShippingDetails};
pub use notify::{NotificationEvent, ServerMessage};
pub use retry::{Backoff, RetryPolicy};
