//! Server assembly and lifecycle

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::api;

use super::state::ServerState;

/// HTTP server wrapping the router, listener, and graceful shutdown
pub struct Server {
    state: ServerState,
    shutdown: CancellationToken,
}

impl Server {
    pub fn new(state: ServerState) -> Self {
        Self {
            state,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops the server when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Bind the configured port and serve until shutdown
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = format!("0.0.0.0:{}", self.state.config.http_port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener (tests bind port 0 themselves)
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        let addr = listener.local_addr().context("listener has no local addr")?;
        tracing::info!("storefront-server listening on {addr}");

        let shutdown = self.shutdown.clone();
        let app = api::router(self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .context("server error")?;

        tracing::info!("storefront-server stopped");
        Ok(())
    }
}
