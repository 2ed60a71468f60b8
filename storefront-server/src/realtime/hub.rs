//! RealtimeHub - in-process fan-out of order events
//!
//! ```text
//! Order API handler
//!       │ NotificationEvent
//!       ▼
//! RealtimeHub
//!   ├── events: broadcast::Sender (feeds every SSE connection)
//!   └── user_subscriptions: user_id → (conn_id → mpsc::Sender)
//!         │
//!         ▼
//!   WebSocket connections subscribed via subscribe_user_orders
//! ```

use dashmap::DashMap;
use shared::error::AppResult;
use shared::notify::{NotificationEvent, ServerMessage};
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

/// Keepalive cadence for both WebSocket and SSE connections
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Broadcast channel capacity - enough to buffer connect-time bursts
const BROADCAST_CAPACITY: usize = 256;

/// Per-connection outbound queue capacity
const CONNECTION_QUEUE: usize = 32;

pub struct RealtimeHub {
    /// user_id → (conn_id → outbound sender)
    user_subscriptions: DashMap<String, HashMap<Uuid, mpsc::Sender<ServerMessage>>>,
    /// Fan-out feed for SSE connections
    events: broadcast::Sender<NotificationEvent>,
    /// Open SSE connections (conn_id → connected_at millis)
    sse_connections: DashMap<Uuid, i64>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            user_subscriptions: DashMap::new(),
            events,
            sse_connections: DashMap::new(),
        }
    }

    /// Queue capacity for new WebSocket connections
    pub fn connection_queue_capacity() -> usize {
        CONNECTION_QUEUE
    }

    /// Subscribe to the raw event feed (SSE endpoint)
    pub fn subscribe_events(&self) -> broadcast::Receiver<NotificationEvent> {
        self.events.subscribe()
    }

    /// Track an SSE connection
    pub fn register_sse(&self, conn_id: Uuid) {
        self.sse_connections
            .insert(conn_id, shared::util::now_millis());
        tracing::debug!(%conn_id, total = self.sse_connections.len(), "SSE client connected");
    }

    /// Remove an SSE connection (called on client disconnect)
    pub fn unregister_sse(&self, conn_id: Uuid) {
        self.sse_connections.remove(&conn_id);
        tracing::debug!(%conn_id, total = self.sse_connections.len(), "SSE client disconnected");
    }

    /// Number of currently tracked SSE connections
    pub fn sse_connection_count(&self) -> usize {
        self.sse_connections.len()
    }

    /// Register a WebSocket connection for a user's order updates
    pub fn subscribe_user(&self, user_id: &str, conn_id: Uuid, tx: mpsc::Sender<ServerMessage>) {
        self.user_subscriptions
            .entry(user_id.to_string())
            .or_default()
            .insert(conn_id, tx);
        tracing::debug!(user_id, %conn_id, "User subscribed to order updates");
    }

    /// Remove one connection from every user entry
    pub fn unsubscribe_conn(&self, conn_id: Uuid) {
        self.user_subscriptions.retain(|_, conns| {
            conns.remove(&conn_id);
            !conns.is_empty()
        });
    }

    /// Number of connections currently subscribed for a user
    pub fn subscriber_count(&self, user_id: &str) -> usize {
        self.user_subscriptions
            .get(user_id)
            .map(|conns| conns.len())
            .unwrap_or(0)
    }

    /// Publish an event: always feeds the SSE stream; status updates are
    /// additionally pushed to the owner's WebSocket subscriptions.
    ///
    /// Returns the number of WebSocket connections the event was queued to.
    /// Delivery is best-effort - a connection with a full queue is skipped.
    pub fn publish(&self, event: &NotificationEvent, user: Option<&str>) -> AppResult<usize> {
        // A send error only means no SSE listener is currently connected
        let _ = self.events.send(event.clone());

        let mut delivered = 0;
        if let NotificationEvent::OrderStatusUpdate { data, .. } = event
            && let Some(user_id) = user
            && let Some(conns) = self.user_subscriptions.get(user_id)
        {
            for (conn_id, tx) in conns.iter() {
                let msg = ServerMessage::OrderStatusUpdated {
                    update: data.clone(),
                };
                match tx.try_send(msg) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!(%conn_id, error = %e, "Dropping realtime push for slow connection");
                    }
                }
            }
        }
        Ok(delivered)
    }
}
