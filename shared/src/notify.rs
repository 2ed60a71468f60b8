//! Notification events and the realtime wire protocol
//!
//! [`NotificationEvent`] is the ephemeral fan-out payload - it exists only
//! for the duration of a dispatch and is never persisted.
//!
//! [`ClientMessage`] / [`ServerMessage`] form the duplex protocol over the
//! realtime WebSocket. Event kinds are tagged enum variants rather than
//! free-form strings, so an unknown event is a deserialization error instead
//! of a silently ignored callback.

use crate::models::{Order, OrderStatusUpdate};
use serde::{Deserialize, Serialize};

/// An order event flowing through the notification dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A new order was placed
    NewOrder {
        timestamp: i64,
        data: Box<Order>,
    },
    /// An existing order changed status
    OrderStatusUpdate {
        timestamp: i64,
        data: OrderStatusUpdate,
    },
}

impl NotificationEvent {
    /// Build a `new_order` event stamped with the current time
    pub fn new_order(order: Order) -> Self {
        Self::NewOrder {
            timestamp: crate::util::now_millis(),
            data: Box::new(order),
        }
    }

    /// Build an `order_status_update` event stamped with the current time
    pub fn status_update(update: OrderStatusUpdate) -> Self {
        Self::OrderStatusUpdate {
            timestamp: crate::util::now_millis(),
            data: update,
        }
    }

    /// The user the event concerns, if any (guest orders have none)
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::NewOrder { data, .. } => data.user_id.as_deref(),
            Self::OrderStatusUpdate { .. } => None,
        }
    }

    /// Wire name of the event kind
    pub fn kind(&self) -> EventKind {
        match self {
            Self::NewOrder { .. } => EventKind::NewOrder,
            Self::OrderStatusUpdate { .. } => EventKind::OrderStatusUpdate,
        }
    }
}

/// Event kind, used as the key for local subscriber registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NewOrder,
    OrderStatusUpdate,
}

/// Messages the client sends over the realtime connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to status updates for a user's orders
    SubscribeUserOrders { user_id: String },
    /// Drop the current subscription
    UnsubscribeUserOrders,
}

/// Messages the server pushes over the realtime connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once immediately after the connection is established
    Connected { timestamp: i64 },
    /// Keepalive, sent every 30 seconds
    Heartbeat { timestamp: i64 },
    /// Acknowledges a subscription request
    Subscribed { user_id: String },
    /// An order belonging to the subscribed user changed status
    OrderStatusUpdated { update: OrderStatusUpdate },
}
