//! SSE notification feed
//!
//! `GET /api/orders/notifications` streams every order event to connected
//! clients, with a heartbeat frame every 30 seconds so intermediaries keep
//! the connection open. Connections are tracked on the hub for observability
//! and unregistered when the client drops the stream.

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::{Stream, StreamExt};
use shared::notify::{EventKind, NotificationEvent};
use shared::util::now_millis;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Interval;
use uuid::Uuid;

use crate::core::ServerState;
use crate::realtime::{HEARTBEAT_INTERVAL_SECS, RealtimeHub};

/// Unregisters the connection when the stream is dropped
struct SseGuard {
    hub: Arc<RealtimeHub>,
    conn_id: Uuid,
}

impl Drop for SseGuard {
    fn drop(&mut self) {
        self.hub.unregister_sse(self.conn_id);
    }
}

struct FeedState {
    rx: broadcast::Receiver<NotificationEvent>,
    heartbeat: Interval,
    _guard: SseGuard,
}

/// GET /api/orders/notifications
pub async fn order_notifications(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let conn_id = Uuid::new_v4();
    state.realtime.register_sse(conn_id);

    let mut heartbeat =
        tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
    heartbeat.tick().await; // skip immediate tick

    let feed = FeedState {
        rx: state.realtime.subscribe_events(),
        heartbeat,
        _guard: SseGuard {
            hub: state.realtime.clone(),
            conn_id,
        },
    };

    let connected = control_frame("connected");

    let updates = futures::stream::unfold(feed, |mut feed| async move {
        loop {
            tokio::select! {
                event = feed.rx.recv() => match event {
                    Ok(event) => match event_frame(&event) {
                        Some(frame) => return Some((Ok(frame), feed)),
                        None => continue,
                    },
                    // Lagged: this connection missed events; keep streaming
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "SSE connection lagged behind event feed");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                },
                _ = feed.heartbeat.tick() => {
                    return Some((Ok(control_frame("heartbeat")), feed));
                }
            }
        }
    });

    let stream = futures::stream::once(async move { Ok(connected) }).chain(updates);
    Sse::new(stream)
}

/// Connection-control frame (`connected`, `heartbeat`).
///
/// The `data` payload carries a `type` discriminator so consumers reading
/// only the payloads can tell frames apart.
fn control_frame(kind: &str) -> Event {
    Event::default().event(kind).data(format!(
        r#"{{"type":"{kind}","timestamp":{}}}"#,
        now_millis()
    ))
}

fn event_frame(event: &NotificationEvent) -> Option<Event> {
    let name = match event.kind() {
        EventKind::NewOrder => "new_order",
        EventKind::OrderStatusUpdate => "order_status_update",
    };
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().event(name).data(json)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize notification event");
            None
        }
    }
}
