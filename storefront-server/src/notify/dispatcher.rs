//! Notification dispatcher - fans one order event out to three channels
//!
//! Channel order is fixed: realtime push, then webhook (when configured),
//! then local in-process subscribers. Outcomes are independent; a failure in
//! one channel never prevents the others from being attempted.

use serde::Serialize;
use shared::models::{Order, OrderStatusUpdate};
use shared::notify::{EventKind, NotificationEvent};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::realtime::RealtimeHub;

use super::webhook::WebhookSender;

/// Per-channel delivery outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChannelOutcome {
    /// Delivered after `attempts` tries
    Delivered { attempts: u32 },
    /// All attempts failed; the final error is carried for logging
    Failed { attempts: u32, error: String },
    /// Channel not configured, reported as not-attempted
    Skipped,
}

impl ChannelOutcome {
    pub fn success(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Aggregated outcome of one dispatch
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub realtime: ChannelOutcome,
    pub webhook: ChannelOutcome,
    pub local: ChannelOutcome,
}

/// Handle for removing a local subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Callback = Arc<dyn Fn(&NotificationEvent) + Send + Sync>;

/// Typed local subscriber registry
///
/// Subscribers register per [`EventKind`] - a tagged enum rather than a
/// free-form event-name string. Emission is synchronous and best-effort: a
/// panicking subscriber is isolated and the rest still run.
#[derive(Default)]
pub struct LocalSubscribers {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<EventKind, Vec<(SubscriberId, Callback)>>>,
}

impl LocalSubscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> SubscriberId
    where
        F: Fn(&NotificationEvent) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        subscribers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        for list in subscribers.values_mut() {
            list.retain(|(sub_id, _)| *sub_id != id);
        }
    }

    /// Invoke every subscriber registered for the event's kind
    pub fn emit(&self, event: &NotificationEvent) -> ChannelOutcome {
        let callbacks: Vec<Callback> = {
            let subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
            subscribers
                .get(&event.kind())
                .map(|list| list.iter().map(|(_, cb)| cb.clone()).collect())
                .unwrap_or_default()
        };

        for callback in callbacks {
            // One panicking subscriber must not stop the rest
            if std::panic::catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                tracing::warn!(kind = ?event.kind(), "Local subscriber panicked during emit");
            }
        }

        ChannelOutcome::Delivered { attempts: 1 }
    }
}

/// Order notification dispatcher
pub struct Notifier {
    hub: Arc<RealtimeHub>,
    webhook: Option<WebhookSender>,
    local: LocalSubscribers,
}

impl Notifier {
    pub fn new(hub: Arc<RealtimeHub>, webhook: Option<WebhookSender>) -> Self {
        Self {
            hub,
            webhook,
            local: LocalSubscribers::new(),
        }
    }

    /// Access the local subscriber registry
    pub fn local(&self) -> &LocalSubscribers {
        &self.local
    }

    /// Dispatch a `new_order` event
    pub async fn notify_new_order(&self, order: Order) -> DispatchReport {
        let user = order.user_id.clone();
        let event = NotificationEvent::new_order(order);
        self.dispatch(&event, user.as_deref()).await
    }

    /// Dispatch an `order_status_update` event to the order's owner
    pub async fn notify_status_update(
        &self,
        order: &Order,
        update: OrderStatusUpdate,
    ) -> DispatchReport {
        let event = NotificationEvent::status_update(update);
        self.dispatch(&event, order.user_id.as_deref()).await
    }

    /// Fan an event out to all three channels, reporting every outcome
    pub async fn dispatch(&self, event: &NotificationEvent, user: Option<&str>) -> DispatchReport {
        // 1. Realtime push (hub delivery is best-effort)
        let realtime = match self.hub.publish(event, user) {
            Ok(receivers) => {
                tracing::debug!(receivers, "Realtime push delivered");
                ChannelOutcome::Delivered { attempts: 1 }
            }
            Err(e) => ChannelOutcome::Failed {
                attempts: 1,
                error: e.message,
            },
        };

        // 2. Webhook (only when a receiver URL is configured)
        let webhook = match &self.webhook {
            Some(sender) => sender.send(event).await,
            None => ChannelOutcome::Skipped,
        };

        // 3. Local in-process subscribers
        let local = self.local.emit(event);

        let report = DispatchReport {
            realtime,
            webhook,
            local,
        };
        tracing::info!(
            realtime_ok = report.realtime.success(),
            webhook_ok = report.webhook.success(),
            local_ok = report.local.success(),
            "Notification dispatched"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderStatus;
    use std::sync::atomic::AtomicUsize;

    fn status_event() -> NotificationEvent {
        NotificationEvent::status_update(OrderStatusUpdate {
            order_id: "ORD-1".into(),
            status: OrderStatus::Shipped,
            updated_at: 1,
        })
    }

    #[test]
    fn test_subscribe_and_emit() {
        let subscribers = LocalSubscribers::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        subscribers.subscribe(EventKind::OrderStatusUpdate, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let outcome = subscribers.emit(&status_event());
        assert!(outcome.success());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_emit_only_matching_kind() {
        let subscribers = LocalSubscribers::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        subscribers.subscribe(EventKind::NewOrder, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        subscribers.emit(&status_event());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panicking_subscriber_does_not_stop_others() {
        let subscribers = LocalSubscribers::new();
        let hits = Arc::new(AtomicUsize::new(0));

        subscribers.subscribe(EventKind::OrderStatusUpdate, |_| {
            panic!("subscriber bug");
        });
        let counter = hits.clone();
        subscribers.subscribe(EventKind::OrderStatusUpdate, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let outcome = subscribers.emit(&status_event());
        assert!(outcome.success());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_removes_callback() {
        let subscribers = LocalSubscribers::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let id = subscribers.subscribe(EventKind::OrderStatusUpdate, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        subscribers.unsubscribe(id);

        subscribers.emit(&status_event());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
