//! Realtime order-update fan-out
//!
//! The hub tracks per-user WebSocket subscriptions and feeds the SSE
//! notification stream; `ws` handles the connection lifecycle.

mod hub;
mod ws;

pub use hub::{HEARTBEAT_INTERVAL_SECS, RealtimeHub};
pub use ws::handle_ws;
