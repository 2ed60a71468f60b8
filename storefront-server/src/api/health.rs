//! Health check endpoint

use axum::extract::State;
use serde::Serialize;
use shared::response::ApiResponse;
use shared::util::now_millis;

use crate::core::ServerState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: i64,
    pub sse_connections: usize,
}

/// GET /health
pub async fn health_check(State(state): State<ServerState>) -> ApiResponse<HealthStatus> {
    ApiResponse::ok(HealthStatus {
        status: "ok",
        timestamp: now_millis(),
        sse_connections: state.realtime.sse_connection_count(),
    })
}
