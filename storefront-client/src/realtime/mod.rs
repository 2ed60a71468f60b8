//! Realtime order updates over WebSocket
//!
//! The connection state machine lives in [`client`]; the wire transport is
//! abstracted behind [`transport::Transport`] so tests can drive the state
//! machine without a network.

mod client;
mod transport;

pub use client::{ConnectionState, RealtimeClient};
pub use transport::{Transport, TransportConnector, WsConnector};
