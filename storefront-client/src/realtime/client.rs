//! Realtime connection state machine
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──▶ Connected
//!                                 │              │ connection lost
//!                                 ▼              ▼
//!                            Reconnecting { attempt 1..=5 }
//!                                 │ all attempts fail
//!                                 ▼
//!                              GivenUp
//! ```
//!
//! Reconnect delays are linear (1s, 2s, 3s, 4s, 5s). A subscription issued
//! while offline is queued and replayed after every successful (re)connect.

use shared::notify::{ClientMessage, ServerMessage};
use shared::retry::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::ClientResult;

use super::transport::{Transport, TransportConnector, WsConnector};

const EVENT_CAPACITY: usize = 64;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Observable connection state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Waiting out the backoff before reconnect attempt `attempt`
    Reconnecting { attempt: u32 },
    /// Every reconnect attempt failed; no further attempts until `connect()`
    GivenUp { attempts: u32 },
}

struct Inner {
    connector: Box<dyn TransportConnector>,
    url: String,
    policy: RetryPolicy,
    /// Bound on each connect attempt; a hung dial counts as a failure
    connect_timeout: Duration,
    state_tx: watch::Sender<ConnectionState>,
    events: broadcast::Sender<ServerMessage>,
    /// Queued `subscribe_user_orders` target, replayed on every connect
    subscription: Mutex<Option<String>>,
    /// Live transport while connected
    current: Mutex<Option<Arc<dyn Transport>>>,
    /// Cancels the running connection loop
    cancel: Mutex<Option<CancellationToken>>,
}

/// WebSocket client for realtime order updates
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<Inner>,
}

impl RealtimeClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::build(Box::new(WsConnector), url.into(), DEFAULT_CONNECT_TIMEOUT)
    }

    /// Build from config (WebSocket URL and connect timeout)
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::build(
            Box::new(WsConnector),
            config.ws_url.clone(),
            config.connect_timeout,
        )
    }

    /// Build with a custom transport factory (tests inject fakes here)
    pub fn with_connector(connector: Box<dyn TransportConnector>, url: impl Into<String>) -> Self {
        Self::build(connector, url.into(), DEFAULT_CONNECT_TIMEOUT)
    }

    fn build(
        connector: Box<dyn TransportConnector>,
        url: String,
        connect_timeout: Duration,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                connector,
                url,
                policy: RetryPolicy::reconnect(),
                connect_timeout,
                state_tx,
                events,
                subscription: Mutex::new(None),
                current: Mutex::new(None),
                cancel: Mutex::new(None),
            }),
        }
    }

    /// Watch the connection state, including `GivenUp`
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Receive server pushes (order updates, heartbeats, acks)
    pub fn events(&self) -> broadcast::Receiver<ServerMessage> {
        self.inner.events.subscribe()
    }

    /// Subscribe to a user's order updates.
    ///
    /// Takes effect immediately when connected; otherwise the subscription is
    /// queued and sent as soon as a connection is established.
    pub async fn subscribe_user_orders(&self, user_id: impl Into<String>) -> ClientResult<()> {
        let user_id = user_id.into();
        *self.inner.subscription.lock().await = Some(user_id.clone());
        let transport = self.inner.current.lock().await.clone();
        if let Some(transport) = transport {
            transport
                .write_message(&ClientMessage::SubscribeUserOrders { user_id })
                .await?;
        }
        Ok(())
    }

    /// Drop the current subscription
    pub async fn unsubscribe(&self) -> ClientResult<()> {
        *self.inner.subscription.lock().await = None;
        let transport = self.inner.current.lock().await.clone();
        if let Some(transport) = transport {
            transport
                .write_message(&ClientMessage::UnsubscribeUserOrders)
                .await?;
        }
        Ok(())
    }

    /// Start (or restart) the connection loop.
    ///
    /// An existing connection is torn down first, so calling `connect` after
    /// `GivenUp` starts a fresh attempt sequence.
    pub async fn connect(&self) {
        self.disconnect().await;

        let token = CancellationToken::new();
        *self.inner.cancel.lock().await = Some(token.clone());
        let _ = self.inner.state_tx.send(ConnectionState::Connecting);

        let inner = self.inner.clone();
        tokio::spawn(run_loop(inner, token));
    }

    /// Stop the connection loop and close any open connection
    pub async fn disconnect(&self) {
        if let Some(token) = self.inner.cancel.lock().await.take() {
            token.cancel();
        }
        if let Some(transport) = self.inner.current.lock().await.take() {
            let _ = transport.close().await;
        }
        let _ = self.inner.state_tx.send(ConnectionState::Disconnected);
    }
}

async fn run_loop(inner: Arc<Inner>, token: CancellationToken) {
    // Consecutive failed attempts since the last working connection
    let mut failures: u32 = 0;

    loop {
        if token.is_cancelled() {
            return;
        }

        // The dial itself is bounded and cancellable; a black-holed server
        // must not pin the state machine in Connecting
        let attempt = tokio::select! {
            _ = token.cancelled() => return,
            result = tokio::time::timeout(
                inner.connect_timeout,
                inner.connector.connect(&inner.url),
            ) => result,
        };

        match attempt {
            Ok(Ok(transport)) => {
                let transport: Arc<dyn Transport> = Arc::from(transport);
                failures = 0;
                *inner.current.lock().await = Some(transport.clone());

                // Replay the queued subscription before announcing Connected
                let queued = inner.subscription.lock().await.clone();
                if let Some(user_id) = queued
                    && let Err(e) = transport
                        .write_message(&ClientMessage::SubscribeUserOrders { user_id })
                        .await
                {
                    tracing::warn!(error = %e, "Failed to replay subscription");
                }

                let _ = inner.state_tx.send(ConnectionState::Connected);
                tracing::info!("Realtime connection established");

                loop {
                    tokio::select! {
                        _ = token.cancelled() => {
                            let _ = transport.close().await;
                            return;
                        }
                        msg = transport.read_message() => match msg {
                            Ok(msg) => {
                                // No receivers is fine
                                let _ = inner.events.send(msg);
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Realtime connection lost");
                                break;
                            }
                        }
                    }
                }
                inner.current.lock().await.take();
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Realtime connect failed");
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = inner.connect_timeout.as_millis() as u64,
                    "Realtime connect timed out"
                );
            }
        }

        failures += 1;
        if failures > inner.policy.max_attempts {
            let attempts = inner.policy.max_attempts;
            tracing::error!(attempts, "Realtime connection given up");
            let _ = inner.state_tx.send(ConnectionState::GivenUp { attempts });
            return;
        }

        let _ = inner
            .state_tx
            .send(ConnectionState::Reconnecting { attempt: failures });
        let delay = inner.policy.delay_for(failures - 1);
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::time::Instant;

    struct FailingConnector {
        attempts: Arc<StdMutex<Vec<Instant>>>,
    }

    #[async_trait]
    impl TransportConnector for FailingConnector {
        async fn connect(&self, _url: &str) -> ClientResult<Box<dyn Transport>> {
            self.attempts.lock().unwrap().push(Instant::now());
            Err(ClientError::Connection("connection refused".into()))
        }
    }

    struct HangingConnector {
        attempts: Arc<StdMutex<u32>>,
    }

    #[async_trait]
    impl TransportConnector for HangingConnector {
        async fn connect(&self, _url: &str) -> ClientResult<Box<dyn Transport>> {
            *self.attempts.lock().unwrap() += 1;
            std::future::pending().await
        }
    }

    struct RecordingTransport {
        writes: Arc<StdMutex<Vec<ClientMessage>>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn read_message(&self) -> ClientResult<ServerMessage> {
            std::future::pending().await
        }

        async fn write_message(&self, msg: &ClientMessage) -> ClientResult<()> {
            self.writes.lock().unwrap().push(msg.clone());
            Ok(())
        }

        async fn close(&self) -> ClientResult<()> {
            Ok(())
        }
    }

    struct RecordingConnector {
        writes: Arc<StdMutex<Vec<ClientMessage>>>,
    }

    #[async_trait]
    impl TransportConnector for RecordingConnector {
        async fn connect(&self, _url: &str) -> ClientResult<Box<dyn Transport>> {
            Ok(Box::new(RecordingTransport {
                writes: self.writes.clone(),
            }))
        }
    }

    async fn wait_for(
        state: &mut watch::Receiver<ConnectionState>,
        pred: impl Fn(&ConnectionState) -> bool,
    ) {
        loop {
            if pred(&state.borrow()) {
                return;
            }
            state.changed().await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_five_reconnect_attempts() {
        let attempts = Arc::new(StdMutex::new(Vec::new()));
        let client = RealtimeClient::with_connector(
            Box::new(FailingConnector {
                attempts: attempts.clone(),
            }),
            "ws://localhost:4000/ws",
        );
        let mut state = client.state();

        client.connect().await;
        wait_for(&mut state, |s| {
            matches!(s, ConnectionState::GivenUp { .. })
        })
        .await;

        assert_eq!(
            *state.borrow(),
            ConnectionState::GivenUp { attempts: 5 }
        );

        // 1 initial try + 5 reconnects, spaced linearly
        let times = attempts.lock().unwrap();
        assert_eq!(times.len(), 6);
        let gaps: Vec<u64> = times
            .windows(2)
            .map(|w| (w[1] - w[0]).as_millis() as u64)
            .collect();
        assert_eq!(gaps, vec![1000, 2000, 3000, 4000, 5000]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_connect_attempt_times_out() {
        let attempts = Arc::new(StdMutex::new(0));
        let client = RealtimeClient::with_connector(
            Box::new(HangingConnector {
                attempts: attempts.clone(),
            }),
            "ws://localhost:4000/ws",
        );
        let mut state = client.state();

        // A dial that never resolves must count as a failed attempt and
        // feed the normal reconnect schedule, not pin the client in
        // Connecting
        client.connect().await;
        wait_for(&mut state, |s| {
            matches!(s, ConnectionState::Reconnecting { attempt: 1 })
        })
        .await;

        wait_for(&mut state, |s| {
            matches!(s, ConnectionState::GivenUp { .. })
        })
        .await;
        assert_eq!(*attempts.lock().unwrap(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_aborts_hung_connect() {
        let attempts = Arc::new(StdMutex::new(0));
        let client = RealtimeClient::with_connector(
            Box::new(HangingConnector {
                attempts: attempts.clone(),
            }),
            "ws://localhost:4000/ws",
        );

        client.connect().await;
        tokio::task::yield_now().await;
        assert_eq!(*attempts.lock().unwrap(), 1);

        client.disconnect().await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        // The stale loop is gone; no further dials
        assert_eq!(*attempts.lock().unwrap(), 1);
        assert_eq!(*client.state().borrow(), ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_stops_reconnecting() {
        let attempts = Arc::new(StdMutex::new(Vec::new()));
        let client = RealtimeClient::with_connector(
            Box::new(FailingConnector {
                attempts: attempts.clone(),
            }),
            "ws://localhost:4000/ws",
        );
        let mut state = client.state();

        client.connect().await;
        wait_for(&mut state, |s| {
            matches!(s, ConnectionState::Reconnecting { .. })
        })
        .await;

        client.disconnect().await;
        let before = attempts.lock().unwrap().len();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(*state.borrow(), ConnectionState::Disconnected);
        assert_eq!(attempts.lock().unwrap().len(), before);
    }

    #[tokio::test]
    async fn test_queued_subscription_sent_on_connect() {
        let writes = Arc::new(StdMutex::new(Vec::new()));
        let client = RealtimeClient::with_connector(
            Box::new(RecordingConnector {
                writes: writes.clone(),
            }),
            "ws://localhost:4000/ws",
        );
        let mut state = client.state();

        // Subscribe while offline: must be queued, not dropped
        client.subscribe_user_orders("user-1").await.unwrap();
        client.connect().await;
        wait_for(&mut state, |s| *s == ConnectionState::Connected).await;

        let writes = writes.lock().unwrap();
        assert!(matches!(
            writes.as_slice(),
            [ClientMessage::SubscribeUserOrders { user_id }] if user_id == "user-1"
        ));
    }

    #[tokio::test]
    async fn test_subscribe_while_connected_writes_immediately() {
        let writes = Arc::new(StdMutex::new(Vec::new()));
        let client = RealtimeClient::with_connector(
            Box::new(RecordingConnector {
                writes: writes.clone(),
            }),
            "ws://localhost:4000/ws",
        );
        let mut state = client.state();

        client.connect().await;
        wait_for(&mut state, |s| *s == ConnectionState::Connected).await;
        client.subscribe_user_orders("user-2").await.unwrap();

        let writes = writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
    }
}
