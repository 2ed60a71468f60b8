//! Transport abstraction for the realtime connection

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use shared::notify::{ClientMessage, ServerMessage};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::{ClientError, ClientResult};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One established realtime connection
#[async_trait]
pub trait Transport: Send + Sync {
    /// Next server message; `Err` means the connection is gone
    async fn read_message(&self) -> ClientResult<ServerMessage>;
    async fn write_message(&self, msg: &ClientMessage) -> ClientResult<()>;
    async fn close(&self) -> ClientResult<()>;
}

/// Connection factory, one call per (re)connect attempt
#[async_trait]
pub trait TransportConnector: Send + Sync {
    async fn connect(&self, url: &str) -> ClientResult<Box<dyn Transport>>;
}

/// WebSocket transport over tokio-tungstenite
pub struct WsTransport {
    reader: Arc<Mutex<SplitStream<WsStream>>>,
    writer: Arc<Mutex<SplitSink<WsStream, Message>>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn read_message(&self) -> ClientResult<ServerMessage> {
        let mut reader = self.reader.lock().await;
        loop {
            let frame = reader
                .next()
                .await
                .ok_or_else(|| ClientError::Connection("connection closed".into()))?
                .map_err(|e| ClientError::Connection(e.to_string()))?;

            match frame {
                Message::Text(text) => match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(msg) => return Ok(msg),
                    Err(e) => {
                        // Unknown frame types are skipped, not fatal
                        tracing::warn!(error = %e, "Ignoring unparseable server frame");
                    }
                },
                Message::Close(_) => {
                    return Err(ClientError::Connection("server closed connection".into()));
                }
                // ping/pong/binary: nothing to surface
                _ => {}
            }
        }
    }

    async fn write_message(&self, msg: &ClientMessage) -> ClientResult<()> {
        let json = serde_json::to_string(msg)?;
        let mut writer = self.writer.lock().await;
        writer
            .send(Message::text(json))
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))
    }

    async fn close(&self) -> ClientResult<()> {
        let mut writer = self.writer.lock().await;
        let _ = writer.send(Message::Close(None)).await;
        Ok(())
    }
}

/// Connects [`WsTransport`] instances over the network
#[derive(Debug, Default, Clone)]
pub struct WsConnector;

#[async_trait]
impl TransportConnector for WsConnector {
    async fn connect(&self, url: &str) -> ClientResult<Box<dyn Transport>> {
        let (stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        let (writer, reader) = stream.split();
        Ok(Box::new(WsTransport {
            reader: Arc::new(Mutex::new(reader)),
            writer: Arc::new(Mutex::new(writer)),
        }))
    }
}
