//! WebSocket handler for realtime order updates
//!
//! Clients send `subscribe_user_orders` / `unsubscribe_user_orders`; the
//! server pushes `order_status_updated` events plus a 30-second heartbeat.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use shared::notify::{ClientMessage, ServerMessage};
use shared::util::now_millis;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::core::ServerState;

use super::hub::{HEARTBEAT_INTERVAL_SECS, RealtimeHub};

/// GET /ws - upgrade to WebSocket
pub async fn handle_ws(State(state): State<ServerState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: ServerState) {
    let conn_id = Uuid::new_v4();
    let (mut ws_sink, mut ws_stream) = socket.split();

    tracing::info!(%conn_id, "WebSocket connected");

    // Outbound queue: the hub pushes order updates here
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(RealtimeHub::connection_queue_capacity());

    let connected = ServerMessage::Connected {
        timestamp: now_millis(),
    };
    if send_message(&mut ws_sink, &connected).await.is_err() {
        tracing::warn!(%conn_id, "Failed to send connected frame, closing");
        return;
    }

    let mut heartbeat = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
    heartbeat.tick().await; // skip immediate tick

    loop {
        tokio::select! {
            incoming = ws_stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(msg) => {
                                if handle_client_message(
                                    msg, conn_id, &tx, &state, &mut ws_sink,
                                ).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(%conn_id, error = %e, "Ignoring unparseable client message");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // ping/pong/binary: nothing to do
                    Some(Err(e)) => {
                        tracing::warn!(%conn_id, error = %e, "WebSocket read error");
                        break;
                    }
                }
            }

            outbound = rx.recv() => {
                match outbound {
                    Some(msg) => {
                        if send_message(&mut ws_sink, &msg).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            _ = heartbeat.tick() => {
                let beat = ServerMessage::Heartbeat { timestamp: now_millis() };
                if send_message(&mut ws_sink, &beat).await.is_err() {
                    break;
                }
            }
        }
    }

    state.realtime.unsubscribe_conn(conn_id);
    tracing::info!(%conn_id, "WebSocket disconnected");
}

async fn handle_client_message(
    msg: ClientMessage,
    conn_id: Uuid,
    tx: &mpsc::Sender<ServerMessage>,
    state: &ServerState,
    ws_sink: &mut SplitSink<WebSocket, Message>,
) -> Result<(), ()> {
    match msg {
        ClientMessage::SubscribeUserOrders { user_id } => {
            state.realtime.subscribe_user(&user_id, conn_id, tx.clone());
            let ack = ServerMessage::Subscribed { user_id };
            send_message(ws_sink, &ack).await
        }
        ClientMessage::UnsubscribeUserOrders => {
            state.realtime.unsubscribe_conn(conn_id);
            Ok(())
        }
    }
}

async fn send_message(
    ws_sink: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), ()> {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize server message");
            return Err(());
        }
    };
    ws_sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
